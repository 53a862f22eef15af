//! Pre-computed class metadata handed to the prompt builder.
//!
//! Source analysis happens outside this crate; these types only carry its
//! results, typically deserialized from a JSON class context file.

use serde::{Deserialize, Serialize};

/// Kind of a class, used to phrase polymorphism relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassType {
    Interface,
    AbstractClass,
    Class,
    DataClass,
    InlineValueClass,
    Object,
}

impl ClassType {
    /// Relation phrase used when this class derives from a base class.
    pub fn subclass_relation(self) -> &'static str {
        match self {
            Self::Interface => "an interface implementing",
            Self::AbstractClass => "an abstract sub-class of",
            Self::Class => "a sub-class of",
            Self::DataClass => "a sub data class of",
            Self::InlineValueClass => "a sub inline value class of",
            Self::Object => "a sub object of",
        }
    }
}

impl Default for ClassType {
    fn default() -> Self {
        Self::Class
    }
}

/// A method signature and the class that declares it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodRepresentation {
    pub signature: String,
    pub containing_class_qualified_name: String,
}

/// A class as seen by the prompt builder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassRepresentation {
    pub qualified_name: String,
    pub full_text: String,
    #[serde(default)]
    pub methods_declaration: String,
    #[serde(default)]
    pub all_methods: Vec<MethodRepresentation>,
    #[serde(default)]
    pub class_type: ClassType,
}

impl ClassRepresentation {
    pub fn new(qualified_name: impl Into<String>, full_text: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            full_text: full_text.into(),
            methods_declaration: String::new(),
            all_methods: Vec::new(),
            class_type: ClassType::Class,
        }
    }

    pub fn with_class_type(mut self, class_type: ClassType) -> Self {
        self.class_type = class_type;
        self
    }

    pub fn with_methods(mut self, methods: Vec<MethodRepresentation>) -> Self {
        self.all_methods = methods;
        self
    }

    pub fn with_methods_declaration(mut self, declaration: impl Into<String>) -> Self {
        self.methods_declaration = declaration.into();
        self
    }

    /// Simple name, i.e. the last segment of the qualified name.
    pub fn simple_name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_name)
    }
}

/// One base class together with the classes deriving from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolymorphismRelation {
    pub base: ClassRepresentation,
    pub derived: Vec<ClassRepresentation>,
}
