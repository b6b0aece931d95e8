#![deny(warnings)]
//! Heuristic card detection over a page's content and DOM mutations.
//!
//! The page is modelled as a feed of [`PageEvent`]s: a load carrying the
//! visible text, followed by batches of added nodes. A [`Detector`] turns
//! that feed into [`Detection`]s, which is all a counter needs to know about
//! the page.

pub mod detect;
pub mod page;
pub mod stream;

pub use detect::{Detection, Detector, GameKind, UnknownGame};
pub use page::{NodeType, PageEvent, PageLoad, PageNode};
pub use stream::{DetectionStream, StreamError};
