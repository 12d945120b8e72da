use crate::jvm::code::Code;
use crate::jvm::{AccessKeywords, MethodAccessFlags, MethodDescriptor, UnqualifiedName};

/// Declaration of a method, along with its body
#[derive(Clone, Debug)]
pub struct Method {
    pub name: UnqualifiedName,
    pub descriptor: MethodDescriptor,
    pub access_flags: MethodAccessFlags,

    /// Method code implementation (absent for `abstract` and `native` methods)
    pub code: Option<Code>,
}

impl Method {
    pub fn is_static(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::STATIC)
    }

    /// Is this an instance initialization method?
    pub fn is_constructor(&self) -> bool {
        self.name == UnqualifiedName::INIT
    }

    /// Should the method have a body?
    pub fn expects_code(&self) -> bool {
        !self
            .access_flags
            .intersects(MethodAccessFlags::ABSTRACT | MethodAccessFlags::NATIVE)
    }

    /// Human readable signature, such as `public static main([Ljava/lang/String;)V`
    pub fn signature(&self) -> String {
        let keywords = self.access_flags.keywords();
        if keywords.is_empty() {
            format!("{}{}", self.name, self.descriptor)
        } else {
            format!("{} {}{}", keywords, self.name, self.descriptor)
        }
    }
}
