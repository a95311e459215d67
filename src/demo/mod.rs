//! A small arithmetic-and-assignment language, carried in the tree as a
//! worked example of the whole pipeline (builder -> condense -> table ->
//! lex/parse -> traverse).

pub mod lang;
