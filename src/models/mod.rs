pub mod family_member;
pub mod journal_entry;
pub mod mood_entry;
pub mod user;
