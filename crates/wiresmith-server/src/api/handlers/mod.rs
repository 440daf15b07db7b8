pub mod deploy;
pub mod documents;
pub mod mappings;
pub mod remote;
pub mod system;
