//! Checking passes, run in order by [`crate::validate_project`]:
//! - `items`: media-type item loader and global identifier index
//! - `references`: category reference lists against the index
//! - `orphans`: indexed items no category references
//! - `schema`: display attributes and required item fields (optional)
//! - `translations`: translation key parity (optional)
//! - `sweep`: JSON syntax of every other file, unused data files (optional)

pub mod items;
pub mod orphans;
pub mod references;
pub mod schema;
pub mod sweep;
pub mod translations;
