mod ids;
mod note;
mod rule;
mod tag;

pub use ids::{NoteId, TagId};
pub use note::Note;
pub use rule::{WordDictionary, WordRule};
pub use tag::Tag;
