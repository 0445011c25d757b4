pub mod cycle;
pub mod lps;
pub mod path;
pub mod vass;

/// Identifier of a control state of a VASS.
pub type StateId = u32;
