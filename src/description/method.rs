use std::fmt;

use crate::error::Result;

use super::descriptor::parse_method_descriptor;
use super::hierarchy::TypeHierarchy;
use super::types::TypeDescription;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct MethodModifiers(u16);

bitflags! {
    impl MethodModifiers: u16 {
        const PUBLIC = 0x0001;       //	Declared public; may be accessed from outside its package.
        const PRIVATE = 0x0002;      //	Declared private; accessible only within the defining class.
        const PROTECTED = 0x0004;    //	Declared protected; may be accessed within subclasses.
        const STATIC = 0x0008;       //	Declared static.
        const FINAL = 0x0010;        //	Declared final; must not be overridden.
        const SYNCHRONIZED = 0x0020; //	Declared synchronized; invocation is wrapped by a monitor use.
        const BRIDGE = 0x0040;       //	A bridge method, generated by the compiler.
        const VARARGS = 0x0080;      //	Declared with variable number of arguments.
        const NATIVE = 0x0100;       //	Declared native; implemented in a language other than Java.
        const ABSTRACT = 0x0400;     //	Declared abstract; no implementation is provided.
        const STRICT = 0x0800;       //	Declared strictfp; floating-point mode is FP-strict.
        const SYNTHETIC = 0x1000;    //	Declared synthetic; not present in the source code.
    }
}

/// Identity of a method within its declaring type: name plus erased descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignatureKey {
    pub name: String,
    pub descriptor: String,
}

impl fmt::Display for SignatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.descriptor)
    }
}

/// Read-only view of a method: who declares it, what it takes and returns, and how
/// it is dispatched.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodDescription {
    pub declaring_type: TypeDescription,
    /// The declaring type is an interface.
    pub interface: bool,
    pub name: String,
    pub parameter_types: Vec<TypeDescription>,
    pub return_type: TypeDescription,
    pub modifiers: MethodModifiers,
}

pub const CONSTRUCTOR_NAME: &str = "<init>";

impl MethodDescription {
    pub fn new(
        declaring_type: TypeDescription,
        name: impl Into<String>,
        parameter_types: Vec<TypeDescription>,
        return_type: TypeDescription,
    ) -> Self {
        MethodDescription {
            declaring_type,
            interface: false,
            name: name.into(),
            parameter_types,
            return_type,
            modifiers: MethodModifiers::PUBLIC,
        }
    }

    /// Builds a method from its JVM descriptor, e.g. `(ILjava/lang/String;)V`.
    pub fn from_descriptor(
        declaring_type: &str,
        name: impl Into<String>,
        descriptor: &str,
        modifiers: MethodModifiers,
    ) -> Result<Self> {
        let (parameter_types, return_type) = parse_method_descriptor(descriptor)?;
        Ok(MethodDescription::new(
            TypeDescription::reference(declaring_type),
            name,
            parameter_types,
            return_type,
        )
        .with_modifiers(modifiers))
    }

    pub fn with_modifiers(mut self, modifiers: MethodModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn in_interface(mut self) -> Self {
        self.interface = true;
        self
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(MethodModifiers::STATIC)
    }

    pub fn is_private(&self) -> bool {
        self.modifiers.contains(MethodModifiers::PRIVATE)
    }

    pub fn is_bridge(&self) -> bool {
        self.modifiers.contains(MethodModifiers::BRIDGE)
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers.contains(MethodModifiers::ABSTRACT)
    }

    pub fn is_synthetic(&self) -> bool {
        self.modifiers.contains(MethodModifiers::SYNTHETIC)
    }

    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME
    }

    /// A non-abstract instance method declared by an interface.
    pub fn is_default_method(&self) -> bool {
        self.interface && !self.is_static() && !self.is_abstract() && !self.is_private()
    }

    pub fn descriptor(&self) -> String {
        let mut descriptor = String::from("(");
        for parameter in &self.parameter_types {
            descriptor.push_str(&parameter.descriptor());
        }
        descriptor.push(')');
        descriptor.push_str(&self.return_type.descriptor());
        descriptor
    }

    pub fn signature_key(&self) -> SignatureKey {
        SignatureKey {
            name: self.name.clone(),
            descriptor: self.descriptor(),
        }
    }

    /// Slots taken by the arguments, including the receiver of instance methods.
    pub fn stack_size(&self) -> i32 {
        let receiver = if self.is_static() { 0 } else { 1 };
        receiver
            + self
                .parameter_types
                .iter()
                .map(|p| p.stack_size().size())
                .sum::<i32>()
    }

    /// Local variable slot holding the parameter at `index`.
    pub fn parameter_offset(&self, index: usize) -> u16 {
        let receiver = if self.is_static() { 0 } else { 1 };
        let preceding: i32 = self.parameter_types[..index.min(self.parameter_types.len())]
            .iter()
            .map(|p| p.stack_size().size())
            .sum();
        (receiver + preceding) as u16
    }

    /// True if `self` could override `other` with narrower parameter or return
    /// types: same name and arity, every type assignable into `other`'s, and a
    /// different descriptor.
    pub fn is_specialization_of(&self, other: &MethodDescription, hierarchy: &dyn TypeHierarchy) -> bool {
        self.name == other.name
            && self.is_static() == other.is_static()
            && self.parameter_types.len() == other.parameter_types.len()
            && self.descriptor() != other.descriptor()
            && self
                .parameter_types
                .iter()
                .zip(&other.parameter_types)
                .all(|(mine, theirs)| hierarchy.is_assignable(mine, theirs))
            && hierarchy.is_assignable(&self.return_type, &other.return_type)
    }

    /// Whether code in `accessor` may call this method without reflection.
    pub fn is_visible_to(&self, accessor: &TypeDescription) -> bool {
        if self.modifiers.contains(MethodModifiers::PUBLIC) {
            true
        } else if self.is_private() {
            self.declaring_type == *accessor
        } else {
            self.declaring_type.package() == accessor.package()
        }
    }
}

impl fmt::Display for MethodDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}.{}(", self.return_type, self.declaring_type, self.name)?;
        for (i, parameter) in self.parameter_types.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", parameter)?;
        }
        f.write_str(")")
    }
}
