/// JVM type views consumed by the stack algebra and the binder.
use std::fmt;

use crate::stack::StackSize;

/// The primitive kinds of the JVM, including `void` as the absence of a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
    Void,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 9] = [
        PrimitiveType::Boolean,
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Char,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
        PrimitiveType::Void,
    ];

    pub fn stack_size(self) -> StackSize {
        match self {
            PrimitiveType::Long | PrimitiveType::Double => StackSize::Double,
            PrimitiveType::Void => StackSize::Zero,
            _ => StackSize::Single,
        }
    }

    pub fn descriptor(self) -> char {
        match self {
            PrimitiveType::Boolean => 'Z',
            PrimitiveType::Byte => 'B',
            PrimitiveType::Short => 'S',
            PrimitiveType::Char => 'C',
            PrimitiveType::Int => 'I',
            PrimitiveType::Long => 'J',
            PrimitiveType::Float => 'F',
            PrimitiveType::Double => 'D',
            PrimitiveType::Void => 'V',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::Void => "void",
        }
    }

    /// Internal name of the wrapper class, e.g. `java/lang/Integer`.
    pub fn wrapper(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "java/lang/Boolean",
            PrimitiveType::Byte => "java/lang/Byte",
            PrimitiveType::Short => "java/lang/Short",
            PrimitiveType::Char => "java/lang/Character",
            PrimitiveType::Int => "java/lang/Integer",
            PrimitiveType::Long => "java/lang/Long",
            PrimitiveType::Float => "java/lang/Float",
            PrimitiveType::Double => "java/lang/Double",
            PrimitiveType::Void => "java/lang/Void",
        }
    }

    /// Name of the wrapper's accessor that yields the primitive, e.g. `intValue`.
    pub fn unboxing_method(self) -> Option<&'static str> {
        match self {
            PrimitiveType::Boolean => Some("booleanValue"),
            PrimitiveType::Byte => Some("byteValue"),
            PrimitiveType::Short => Some("shortValue"),
            PrimitiveType::Char => Some("charValue"),
            PrimitiveType::Int => Some("intValue"),
            PrimitiveType::Long => Some("longValue"),
            PrimitiveType::Float => Some("floatValue"),
            PrimitiveType::Double => Some("doubleValue"),
            PrimitiveType::Void => None,
        }
    }

    /// Type code used by `newarray`.
    pub fn array_type_code(self) -> Option<u8> {
        match self {
            PrimitiveType::Boolean => Some(4),
            PrimitiveType::Char => Some(5),
            PrimitiveType::Float => Some(6),
            PrimitiveType::Double => Some(7),
            PrimitiveType::Byte => Some(8),
            PrimitiveType::Short => Some(9),
            PrimitiveType::Int => Some(10),
            PrimitiveType::Long => Some(11),
            PrimitiveType::Void => None,
        }
    }

    /// Maps a wrapper class internal name back to its primitive.
    pub fn for_wrapper(internal_name: &str) -> Option<PrimitiveType> {
        PrimitiveType::ALL
            .into_iter()
            .filter(|p| *p != PrimitiveType::Void)
            .find(|p| p.wrapper() == internal_name)
    }
}

/// A JVM type: primitive (including void), class/interface reference or array.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeDescription {
    Primitive(PrimitiveType),
    /// Internal name, e.g. `java/lang/String`.
    Reference(String),
    Array(Box<TypeDescription>),
}

impl TypeDescription {
    pub const VOID: TypeDescription = TypeDescription::Primitive(PrimitiveType::Void);
    pub const INT: TypeDescription = TypeDescription::Primitive(PrimitiveType::Int);
    pub const LONG: TypeDescription = TypeDescription::Primitive(PrimitiveType::Long);
    pub const BOOLEAN: TypeDescription = TypeDescription::Primitive(PrimitiveType::Boolean);
    pub const DOUBLE: TypeDescription = TypeDescription::Primitive(PrimitiveType::Double);

    pub fn reference(internal_name: impl Into<String>) -> Self {
        TypeDescription::Reference(internal_name.into())
    }

    pub fn array_of(component: TypeDescription) -> Self {
        TypeDescription::Array(Box::new(component))
    }

    pub fn object() -> Self {
        TypeDescription::reference("java/lang/Object")
    }

    pub fn string() -> Self {
        TypeDescription::reference("java/lang/String")
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeDescription::Primitive(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeDescription::Primitive(PrimitiveType::Void))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeDescription::Array(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, TypeDescription::Reference(name) if name == "java/lang/Object")
    }

    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            TypeDescription::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    pub fn component_type(&self) -> Option<&TypeDescription> {
        match self {
            TypeDescription::Array(inner) => Some(inner),
            _ => None,
        }
    }

    /// The number of operand stack slots a value of this type occupies.
    pub fn stack_size(&self) -> StackSize {
        match self {
            TypeDescription::Primitive(p) => p.stack_size(),
            _ => StackSize::Single,
        }
    }

    /// The wrapper reference type of a primitive, or `None` for references and void.
    pub fn boxed(&self) -> Option<TypeDescription> {
        match self {
            TypeDescription::Primitive(PrimitiveType::Void) => None,
            TypeDescription::Primitive(p) => Some(TypeDescription::reference(p.wrapper())),
            _ => None,
        }
    }

    /// The primitive behind a wrapper reference type.
    pub fn unboxed(&self) -> Option<PrimitiveType> {
        match self {
            TypeDescription::Reference(name) => PrimitiveType::for_wrapper(name),
            _ => None,
        }
    }

    /// The name used in constant pool class entries: the internal name for classes
    /// and the full descriptor for arrays.
    pub fn internal_name(&self) -> String {
        match self {
            TypeDescription::Reference(name) => name.clone(),
            _ => self.descriptor(),
        }
    }

    pub fn descriptor(&self) -> String {
        match self {
            TypeDescription::Primitive(p) => p.descriptor().to_string(),
            TypeDescription::Reference(name) => format!("L{};", name),
            TypeDescription::Array(inner) => format!("[{}", inner.descriptor()),
        }
    }

    /// The binary (source-like) name, e.g. `java.lang.String` or `int[]`.
    pub fn binary_name(&self) -> String {
        match self {
            TypeDescription::Primitive(p) => p.name().into(),
            TypeDescription::Reference(name) => name.replace('/', "."),
            TypeDescription::Array(inner) => format!("{}[]", inner.binary_name()),
        }
    }

    /// Package of a class reference in internal form, empty for the default package.
    pub fn package(&self) -> Option<&str> {
        match self {
            TypeDescription::Reference(name) => Some(match name.rfind('/') {
                Some(pos) => &name[..pos],
                None => "",
            }),
            _ => None,
        }
    }
}

impl From<PrimitiveType> for TypeDescription {
    fn from(primitive: PrimitiveType) -> Self {
        TypeDescription::Primitive(primitive)
    }
}

impl fmt::Display for TypeDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.binary_name())
    }
}
