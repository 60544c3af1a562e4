//! Runtime helpers for the kopi site.
//!
//! Provides the ad-slot initialization guard used across page transitions and
//! renders the crawler text files the site serves.

pub mod ads;
pub mod meta;

pub use ads::{AdGuard, Admission, DEFAULT_PAUSE};
pub use meta::{ads_txt, robots_txt, SiteConfig};
