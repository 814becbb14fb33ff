//!
//! captcha  -- Squiggles on demand
//!
//! Generates image CAPTCHAs: distorted characters, scattered with random jitter,
//! crossed out with noise and smoothed over.
//!

             extern crate antidote;
             extern crate image;
#[macro_use] extern crate lazy_static;
#[macro_use] extern crate log;
#[macro_use] extern crate maplit;
             extern crate once_cell;
             extern crate rand;
             extern crate rusttype;
             extern crate thiserror;


#[cfg(test)] #[macro_use] extern crate spectral;


mod captcha;
mod model;
mod resources;
mod util;


pub use captcha::*;
pub use model::*;
pub use resources::*;
pub use util::cache::*;
