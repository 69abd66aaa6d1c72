//! Reply (`rpy`) message routing. `route`/`router` implement a small URI-template
//! dispatcher over reply routes (e.g. `/end/role/`, `/loc/scheme`); `revery`
//! is the reply-message escrow/acceptance processor the Kevery hands `rpy`
//! messages to (see spec §4.F and the companion-spec deferral in §9).

pub mod revery;
pub mod route;
pub mod router;

pub use revery::Revery;
pub use router::Router;
