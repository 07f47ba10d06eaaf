use crate::{components::Component, particle::Particle, xstypes::Sequence, Ref};

/// Schema Component: Model Group, a kind of Term (§3.8)
#[derive(Clone, Debug)]
pub struct ModelGroup {
    pub compositor: Compositor,
    pub particles: Sequence<Ref<Particle>>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Compositor {
    All,
    Choice,
    Sequence,
}

impl Compositor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Choice => "choice",
            Self::Sequence => "sequence",
        }
    }
}

impl Component for ModelGroup {
    const DISPLAY_NAME: &'static str = "ModelGroup";
}
