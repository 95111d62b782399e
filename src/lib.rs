//! Stack manipulation algebra and method delegation binding for generating
//! [JVM method bodies](https://docs.oracle.com/javase/specs/jvms/se10/html/jvms-6.html).
//!
//! ```rust
//! use bytecode_bind::bind::{ArgumentSource, Candidate, Processor};
//! use bytecode_bind::code_attribute::{CodeBuffer, Instruction};
//! use bytecode_bind::description::{ClassHierarchy, MethodDescription, MethodModifiers};
//! use bytecode_bind::DelegationOptions;
//!
//! let hierarchy = ClassHierarchy::with_jdk_defaults();
//! let source = MethodDescription::from_descriptor("pkg/Foo", "bar", "(I)J", MethodModifiers::PUBLIC).unwrap();
//! let handler = MethodDescription::from_descriptor(
//!     "pkg/Handler",
//!     "h",
//!     "(I)I",
//!     MethodModifiers::PUBLIC | MethodModifiers::STATIC,
//! )
//! .unwrap();
//!
//! let processor = Processor::new(&hierarchy, DelegationOptions::default());
//! let candidate = Candidate::new(handler).with_source(0, ArgumentSource::FixedArgument(0));
//! let delegation = processor.process(&source, &[candidate]).unwrap();
//!
//! let mut code = CodeBuffer::new();
//! delegation.apply(&mut code).unwrap();
//! assert_eq!(code.instructions[0], Instruction::Iload1);
//! assert_eq!(delegation.max_stack, 2);
//! ```

#[macro_use]
extern crate bitflags;

pub mod assign;
pub mod bind;
pub mod bridge;
pub mod code_attribute;
pub mod description;
pub mod error;
pub mod options;
pub mod stack;

pub use error::{Error, Result};
pub use options::DelegationOptions;
