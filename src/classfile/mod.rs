//! JVM class file codec: constant pool, attribute encoding, and the
//! visitor-driven reader and writer.

pub mod annotation;
pub mod attribute;
pub mod class;
pub mod class_writer;
pub mod constpool;
pub mod cursor;
pub mod defs;
pub mod descriptor;
pub mod error;
pub mod field;
pub mod method;
pub mod mutf8;
pub mod reader;
pub mod visitor;
pub mod writer;

pub use class::ClassFile;
pub use class_writer::ClassWriter;
pub use constpool::{Constant, ConstantPool};
pub use error::{ClassFormatError, ClassGenerationError, ConstPoolError};
pub use mutf8::JavaString;
pub use reader::ClassReader;
pub use visitor::ClassVisitor;
pub use writer::{class_file_to_bytes, ClassfileWritable};
