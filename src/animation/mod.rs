//! Time bases and the procedural jiggle transform.
//!
//! The interactive loop and the exporter use different clocks, but both reduce to seconds of
//! animation time fed through [`jiggle::effective_time`], so equal elapsed seconds render equal
//! geometry.

pub mod clock;
pub mod jiggle;
