use bitflags::bitflags;

bitflags! {
    /// Access flags on classes
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.1-200-E.1
    #[derive(Default)]
    pub struct ClassAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const FINAL = 0x0010;
        const SUPER = 0x0020;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
    }
}

bitflags! {
    /// Access flags on methods
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.6-200-A.1
    #[derive(Default)]
    pub struct MethodAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const BRIDGE = 0x0040;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
    }
}

bitflags! {
    /// Access flags on fields
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.5-200-A.1
    #[derive(Default)]
    pub struct FieldAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const VOLATILE = 0x0040;
        const TRANSIENT = 0x0080;
        const SYNTHETIC = 0x1000;
        const ENUM = 0x4000;
    }
}

/// Access flags that have a keyword spelling in class listings (and in diagnostics)
pub trait AccessKeywords: Sized + Copy + 'static {
    /// Keywords in the order they are conventionally written
    const KEYWORDS: &'static [(&'static str, Self)];

    /// Look up the flag for a keyword
    fn from_keyword(keyword: &str) -> Option<Self> {
        Self::KEYWORDS
            .iter()
            .find(|(kw, _)| *kw == keyword)
            .map(|(_, flag)| *flag)
    }

    /// Render the set flags as space-separated keywords
    fn keywords(&self) -> String;
}

macro_rules! access_keywords {
    ($flags:ty { $($kw:literal => $flag:ident),* $(,)? }) => {
        impl AccessKeywords for $flags {
            const KEYWORDS: &'static [(&'static str, Self)] = &[$(($kw, <$flags>::$flag)),*];

            fn keywords(&self) -> String {
                Self::KEYWORDS
                    .iter()
                    .filter(|(_, flag)| self.contains(*flag))
                    .map(|(kw, _)| *kw)
                    .collect::<Vec<_>>()
                    .join(" ")
            }
        }
    };
}

access_keywords!(ClassAccessFlags {
    "public" => PUBLIC,
    "final" => FINAL,
    "super" => SUPER,
    "interface" => INTERFACE,
    "abstract" => ABSTRACT,
    "synthetic" => SYNTHETIC,
    "annotation" => ANNOTATION,
    "enum" => ENUM,
});

access_keywords!(MethodAccessFlags {
    "public" => PUBLIC,
    "private" => PRIVATE,
    "protected" => PROTECTED,
    "static" => STATIC,
    "final" => FINAL,
    "synchronized" => SYNCHRONIZED,
    "bridge" => BRIDGE,
    "varargs" => VARARGS,
    "native" => NATIVE,
    "abstract" => ABSTRACT,
    "strict" => STRICT,
    "synthetic" => SYNTHETIC,
});

access_keywords!(FieldAccessFlags {
    "public" => PUBLIC,
    "private" => PRIVATE,
    "protected" => PROTECTED,
    "static" => STATIC,
    "final" => FINAL,
    "volatile" => VOLATILE,
    "transient" => TRANSIENT,
    "synthetic" => SYNTHETIC,
    "enum" => ENUM,
});

/// Count how many of the visibility flags are set
///
/// At most one of `public`, `private`, and `protected` may be set on a member.
pub fn visibility_count(bits: u16) -> u32 {
    (bits & 0x0007).count_ones()
}

#[cfg(test)]
mod test {
    use super::*;

    fn lookup<F: AccessKeywords>(keyword: &str) -> Option<String> {
        F::from_keyword(keyword).map(|flag| flag.keywords())
    }

    #[test]
    fn keywords() {
        assert_eq!(
            MethodAccessFlags::from_keyword("static"),
            Some(MethodAccessFlags::STATIC)
        );
        assert_eq!(MethodAccessFlags::from_keyword("interface"), None);
        assert_eq!(
            (MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC).keywords(),
            "public static"
        );
        assert_eq!(ClassAccessFlags::empty().keywords(), "");
        assert_eq!(lookup::<ClassAccessFlags>("enum").as_deref(), Some("enum"));
        assert_eq!(lookup::<FieldAccessFlags>("bridge"), None);
        assert_eq!(visibility_count(FieldAccessFlags::PUBLIC.bits()), 1);
        assert_eq!(
            visibility_count((FieldAccessFlags::PUBLIC | FieldAccessFlags::PRIVATE).bits()),
            2
        );
    }
}
