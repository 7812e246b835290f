mod definition;
mod implementation;


pub use definition::Scan;
