//! Field and method descriptors
//!
//! See <https://docs.oracle.com/javase/specs/jvms/se16/html/jvms-4.html#jvms-4.3>

use super::{BinaryName, Name};
use crate::util::Width;
use std::fmt::{Display, Error as FmtError, Formatter, Write};
use std::str::CharIndices;
use std::iter::Peekable;

/// Descriptor which could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorError {
    /// Byte position in the descriptor where parsing stopped
    pub position: usize,
    pub message: String,
}

impl Display for DescriptorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{} (at position {})", self.message, self.position)
    }
}

pub trait ParseDescriptor: Sized {
    /// Parse a descriptor, which must take up all of `source`
    fn parse(source: &str) -> Result<Self, DescriptorError> {
        let mut reader = DescriptorReader::new(source);
        let parsed = Self::read(&mut reader)?;
        match reader.peek() {
            None => Ok(parsed),
            Some(c) => Err(reader.error(format!("unexpected trailing '{}'", c))),
        }
    }

    fn read(reader: &mut DescriptorReader) -> Result<Self, DescriptorError>;
}

/// Cursor over the characters of a descriptor
pub struct DescriptorReader<'s> {
    source: &'s str,
    chars: Peekable<CharIndices<'s>>,
}

impl<'s> DescriptorReader<'s> {
    pub fn new(source: &'s str) -> DescriptorReader<'s> {
        DescriptorReader {
            source,
            chars: source.char_indices().peekable(),
        }
    }

    fn position(&mut self) -> usize {
        self.chars.peek().map_or(self.source.len(), |(pos, _)| *pos)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn bump(&mut self) -> Option<char> {
        self.chars.next().map(|(_, c)| c)
    }

    fn expect(&mut self, expected: char) -> Result<(), DescriptorError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{}' but found '{}'", expected, c))),
            None => Err(self.error(format!("expected '{}' but the descriptor ended", expected))),
        }
    }

    fn error(&mut self, message: impl Into<String>) -> DescriptorError {
        DescriptorError {
            position: self.position(),
            message: message.into(),
        }
    }
}

/// Primitive value types
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl BaseType {
    pub const fn descriptor_char(self) -> char {
        match self {
            BaseType::Byte => 'B',
            BaseType::Char => 'C',
            BaseType::Double => 'D',
            BaseType::Float => 'F',
            BaseType::Int => 'I',
            BaseType::Long => 'J',
            BaseType::Short => 'S',
            BaseType::Boolean => 'Z',
        }
    }

    pub const fn from_descriptor_char(c: char) -> Option<BaseType> {
        Some(match c {
            'B' => BaseType::Byte,
            'C' => BaseType::Char,
            'D' => BaseType::Double,
            'F' => BaseType::Float,
            'I' => BaseType::Int,
            'J' => BaseType::Long,
            'S' => BaseType::Short,
            'Z' => BaseType::Boolean,
            _ => return None,
        })
    }
}

impl Width for BaseType {
    fn width(&self) -> usize {
        match self {
            BaseType::Double | BaseType::Long => 2,
            _ => 1,
        }
    }
}

impl Display for BaseType {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        f.write_char(self.descriptor_char())
    }
}

impl ParseDescriptor for BaseType {
    fn read(reader: &mut DescriptorReader) -> Result<Self, DescriptorError> {
        match reader.peek() {
            Some(c) => match BaseType::from_descriptor_char(c) {
                Some(base_type) => {
                    reader.bump();
                    Ok(base_type)
                }
                None => Err(reader.error(format!("'{}' is not a primitive type", c))),
            },
            None => Err(reader.error("missing primitive type")),
        }
    }
}

/// Array type, split into its innermost element type and its depth
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ArrayType<T> {
    /// Dimensions beyond the first (`A[]` has 0 additional dimensions, `A[][][][]` has 3)
    pub additional_dimensions: usize,

    /// Innermost element type (`A` for `A[][]`)
    pub element_type: T,
}

impl<T> ArrayType<T> {
    pub const fn dimensions(&self) -> usize {
        self.additional_dimensions + 1
    }
}

impl<T: Display> Display for ArrayType<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        for _ in 0..self.dimensions() {
            f.write_char('[')?;
        }
        self.element_type.fmt(f)
    }
}

/// Class name in a descriptor, eg. `Ljava/lang/String;`
fn read_class_name(reader: &mut DescriptorReader) -> Result<BinaryName, DescriptorError> {
    reader.expect('L')?;
    let source = reader.source;
    let start = reader.position();
    while !matches!(reader.peek(), Some(';') | None) {
        reader.bump();
    }
    let end = reader.position();
    let class_name = &source[start..end];
    reader.expect(';')?;
    BinaryName::from_str(class_name).map_err(|message| DescriptorError {
        position: start,
        message,
    })
}

/// Reference type
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum RefType {
    Object(BinaryName),
    ObjectArray(ArrayType<BinaryName>),
    PrimitiveArray(ArrayType<BaseType>),
}

impl RefType {
    /// Number of array dimensions (`0` for class and interface types)
    pub const fn dimensions(&self) -> usize {
        match self {
            RefType::Object(_) => 0,
            RefType::PrimitiveArray(arr) => arr.dimensions(),
            RefType::ObjectArray(arr) => arr.dimensions(),
        }
    }

    pub const fn is_array(&self) -> bool {
        !matches!(self, RefType::Object(_))
    }

    /// Array whose elements have the given type
    pub fn array(component_type: FieldType) -> RefType {
        match component_type {
            FieldType::Base(element_type) => RefType::PrimitiveArray(ArrayType {
                additional_dimensions: 0,
                element_type,
            }),
            FieldType::Ref(RefType::Object(element_type)) => RefType::ObjectArray(ArrayType {
                additional_dimensions: 0,
                element_type,
            }),
            FieldType::Ref(RefType::PrimitiveArray(arr)) => RefType::PrimitiveArray(ArrayType {
                additional_dimensions: arr.dimensions(),
                element_type: arr.element_type,
            }),
            FieldType::Ref(RefType::ObjectArray(arr)) => RefType::ObjectArray(ArrayType {
                additional_dimensions: arr.dimensions(),
                element_type: arr.element_type,
            }),
        }
    }

    /// Type of the elements of an array type (`None` for class and interface types)
    ///
    /// The component type of `[[I` is `[I` and the component type of `[I` is `I`.
    pub fn component_type(&self) -> Option<FieldType> {
        match self {
            RefType::Object(_) => None,
            RefType::PrimitiveArray(arr) => Some(match arr.additional_dimensions {
                0 => FieldType::Base(arr.element_type),
                n => FieldType::Ref(RefType::PrimitiveArray(ArrayType {
                    additional_dimensions: n - 1,
                    element_type: arr.element_type,
                })),
            }),
            RefType::ObjectArray(arr) => Some(match arr.additional_dimensions {
                0 => FieldType::object(arr.element_type.clone()),
                n => FieldType::Ref(RefType::ObjectArray(ArrayType {
                    additional_dimensions: n - 1,
                    element_type: arr.element_type.clone(),
                })),
            }),
        }
    }
}

impl Display for RefType {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            RefType::Object(class_name) => write!(f, "L{};", class_name),
            RefType::PrimitiveArray(arr) => arr.fmt(f),
            RefType::ObjectArray(arr) => {
                for _ in 0..arr.dimensions() {
                    f.write_char('[')?;
                }
                write!(f, "L{};", arr.element_type)
            }
        }
    }
}

impl ParseDescriptor for RefType {
    fn read(reader: &mut DescriptorReader) -> Result<Self, DescriptorError> {
        let mut dimensions = 0;
        while reader.peek() == Some('[') {
            reader.bump();
            dimensions += 1;
        }
        let element = match reader.peek() {
            Some('L') => FieldType::object(read_class_name(reader)?),
            Some(_) if dimensions > 0 => FieldType::Base(BaseType::read(reader)?),
            Some(c) => return Err(reader.error(format!("'{}' does not start a reference type", c))),
            None => return Err(reader.error("missing reference type")),
        };
        let mut ref_type = match element {
            FieldType::Ref(ref_type) => ref_type,
            FieldType::Base(element_type) => {
                dimensions -= 1;
                RefType::PrimitiveArray(ArrayType {
                    additional_dimensions: 0,
                    element_type,
                })
            }
        };
        for _ in 0..dimensions {
            ref_type = RefType::array(FieldType::Ref(ref_type));
        }
        Ok(ref_type)
    }
}

/// Type of a field, parameter, or return value
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum FieldType {
    Base(BaseType),
    Ref(RefType),
}

impl Width for FieldType {
    fn width(&self) -> usize {
        match self {
            FieldType::Base(base_type) => base_type.width(),
            FieldType::Ref(_) => 1,
        }
    }
}

impl FieldType {
    pub fn array(component_type: FieldType) -> FieldType {
        FieldType::Ref(RefType::array(component_type))
    }

    pub const fn object(class_name: BinaryName) -> FieldType {
        FieldType::Ref(RefType::Object(class_name))
    }

    pub const fn int() -> FieldType {
        FieldType::Base(BaseType::Int)
    }

    pub const fn long() -> FieldType {
        FieldType::Base(BaseType::Long)
    }

    pub const fn double() -> FieldType {
        FieldType::Base(BaseType::Double)
    }

    pub const fn boolean() -> FieldType {
        FieldType::Base(BaseType::Boolean)
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            FieldType::Base(base_type) => base_type.fmt(f),
            FieldType::Ref(ref_type) => ref_type.fmt(f),
        }
    }
}

impl ParseDescriptor for FieldType {
    fn read(reader: &mut DescriptorReader) -> Result<Self, DescriptorError> {
        match reader.peek() {
            Some('L' | '[') => RefType::read(reader).map(FieldType::Ref),
            Some(_) => BaseType::read(reader).map(FieldType::Base),
            None => Err(reader.error("missing field type")),
        }
    }
}

/// Parameter and return types of a method
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct MethodDescriptor {
    pub parameters: Vec<FieldType>,

    /// `None` for `void`
    pub return_type: Option<FieldType>,
}

impl MethodDescriptor {
    /// Local variable slots taken up by the parameters, including the receiver if there is one
    ///
    /// Longs and doubles take two slots. A valid method uses at most 255 slots.
    pub fn parameter_slots(&self, has_receiver: bool) -> usize {
        let receiver = if has_receiver { 1 } else { 0 };
        receiver
            + self
                .parameters
                .iter()
                .map(|parameter| parameter.width())
                .sum::<usize>()
    }
}

impl Display for MethodDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        f.write_char('(')?;
        for parameter in &self.parameters {
            parameter.fmt(f)?;
        }
        f.write_char(')')?;
        match &self.return_type {
            None => f.write_char('V'),
            Some(return_type) => return_type.fmt(f),
        }
    }
}

impl ParseDescriptor for MethodDescriptor {
    fn read(reader: &mut DescriptorReader) -> Result<Self, DescriptorError> {
        reader.expect('(')?;
        let mut parameters = vec![];
        loop {
            match reader.peek() {
                Some(')') => break,
                None => return Err(reader.error("unterminated parameter list")),
                Some(_) => parameters.push(FieldType::read(reader)?),
            }
        }
        reader.expect(')')?;

        let return_type = if reader.peek() == Some('V') {
            reader.bump();
            None
        } else {
            Some(FieldType::read(reader)?)
        };

        Ok(MethodDescriptor {
            parameters,
            return_type,
        })
    }
}
