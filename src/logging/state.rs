use once_cell::sync::OnceCell;
use std::sync::Once;

pub static INIT_ONCE: Once = Once::new();
pub static INIT_ERROR: OnceCell<String> = OnceCell::new();
