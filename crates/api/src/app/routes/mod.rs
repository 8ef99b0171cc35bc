pub mod cms;
pub mod system;
