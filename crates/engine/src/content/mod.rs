mod atomic_io;

pub use atomic_io::write_text_atomic;
