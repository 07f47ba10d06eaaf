use roxmltree::Node;

use super::{components::Component, error::ReadError, MappingContext, Ref};

/// Schema Component: Wildcard, a kind of Term (§3.10)
///
/// Only the parts needed to report a wildcard are kept; the namespace constraint is stored in its
/// lexical form.
#[derive(Clone, Debug)]
pub struct Wildcard {
    pub namespace_constraint: String,
    pub process_contents: ProcessContents,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProcessContents {
    Skip,
    Strict,
    Lax,
}

impl Wildcard {
    pub(super) fn map_from_xml(
        context: &mut MappingContext,
        any: Node,
    ) -> Result<Ref<Self>, ReadError> {
        // {process contents}
        //   The ·actual value· of the processContents [attribute], if present, otherwise strict.
        let process_contents = match any.attribute("processContents") {
            None | Some("strict") => ProcessContents::Strict,
            Some("lax") => ProcessContents::Lax,
            Some("skip") => ProcessContents::Skip,
            Some(other) => {
                return Err(ReadError::InvalidValue {
                    attribute: "processContents",
                    value: other.to_string(),
                })
            }
        };

        let namespace_constraint = any.attribute("namespace").unwrap_or("##any").to_string();

        Ok(context.create(Self {
            namespace_constraint,
            process_contents,
        }))
    }
}

impl Component for Wildcard {
    const DISPLAY_NAME: &'static str = "Wildcard";
}
