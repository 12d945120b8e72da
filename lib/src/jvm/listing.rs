//! Textual class listings
//!
//! A listing describes one unit, line by line. Everything after a `#` is a comment.
//!
//! ```text
//! class public super demo/Point extends java/lang/Object
//! field private x I
//! method public <init> (I)V
//!   code stack 2 locals 2
//!     0: aload_0
//!     1: invokespecial java/lang/Object.<init>()V
//!     4: aload_0
//!     5: iload_1
//!     6: putfield demo/Point.x I
//!     9: return
//! end
//! ```
//!
//! Instructions are written with their byte offset and usual mnemonic. Jump operands are absolute
//! offsets, constant pool operands are written out symbolically.

use crate::jvm::code::*;
use crate::jvm::model::{Field, Method, Unit};
use crate::jvm::{
    AccessKeywords, BaseType, BinaryName, ClassAccessFlags, FieldAccessFlags, MethodAccessFlags,
    MethodDescriptor, Name, ParseDescriptor, RefType, UnqualifiedName,
};
use crate::util::Offset;
use std::fmt::{Display, Error as FmtError, Formatter};
use std::str::FromStr;

/// Syntax error in a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingError {
    /// Line number (starting at 1)
    pub line: usize,
    pub message: String,
}

impl Display for ListingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ListingError {}

/// Parse the listing of a single unit
pub fn parse_listing(source: &str) -> Result<Unit, ListingError> {
    let mut parser = ListingParser::default();
    let mut line_count = 0;
    for (line_idx, line) in source.lines().enumerate() {
        line_count = line_idx + 1;
        let at_line = |message| ListingError {
            line: line_idx + 1,
            message,
        };
        let tokens = tokenize(line).map_err(at_line)?;
        if !tokens.is_empty() {
            parser.directive(&tokens).map_err(at_line)?;
        }
    }
    parser.finish().map_err(|message| ListingError {
        line: line_count,
        message,
    })
}

/// Split a line into whitespace separated words
///
/// String literals are returned with their leading `"` (and no trailing one), with escapes
/// already processed.
fn tokenize(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = vec![];
    let mut chars = line.chars().peekable();
    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.peek() {
            None | Some('#') => break,
            Some('"') => {
                chars.next();
                let mut literal = String::from("\"");
                loop {
                    match chars.next() {
                        None => return Err(String::from("unterminated string literal")),
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some('n') => literal.push('\n'),
                            Some('t') => literal.push('\t'),
                            Some(c @ ('"' | '\\')) => literal.push(c),
                            Some(c) => return Err(format!("invalid escape `\\{}`", c)),
                            None => return Err(String::from("unterminated string literal")),
                        },
                        Some(c) => literal.push(c),
                    }
                }
                tokens.push(literal);
            }
            Some(_) => {
                let mut word = String::new();
                while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                    word.push(c);
                }
                tokens.push(word);
            }
        }
    }
    Ok(tokens)
}

#[derive(Default)]
struct ListingParser {
    unit: Option<Unit>,
    method: Option<(Method, Option<PendingCode>)>,
}

struct PendingCode {
    max_stack: u16,
    max_locals: u16,
    length: Option<usize>,
    instructions: Vec<(Offset, Insn)>,
    exception_table: Vec<ExceptionHandler>,
}

impl ListingParser {
    fn directive(&mut self, tokens: &[String]) -> Result<(), String> {
        let mut operands = Operands::new(&tokens[1..]);
        match tokens[0].as_str() {
            "class" => {
                if self.unit.is_some() {
                    return Err(String::from("only one class can be declared per listing"));
                }
                self.unit = Some(parse_class(&mut operands)?);
            }
            "field" => {
                if self.method.is_some() {
                    return Err(String::from("field declared inside a method"));
                }
                let field = parse_field(&mut operands)?;
                self.unit_mut()?.fields.push(field);
            }
            "method" => {
                self.unit_mut()?;
                if self.method.is_some() {
                    return Err(String::from("method declared before `end` of previous method"));
                }
                self.method = Some((parse_method(&mut operands)?, None));
            }
            "code" => match &mut self.method {
                Some((_, code @ None)) => *code = Some(parse_code_header(&mut operands)?),
                Some((_, Some(_))) => return Err(String::from("method already has code")),
                None => return Err(String::from("`code` outside of a method")),
            },
            "catch" => {
                let handler = parse_handler(&mut operands)?;
                self.code_mut()?.exception_table.push(handler);
            }
            "end" => {
                operands.finish()?;
                let (mut method, code) = self
                    .method
                    .take()
                    .ok_or_else(|| String::from("`end` outside of a method"))?;
                method.code = code.map(|code| {
                    let length = code.length.unwrap_or_else(|| {
                        code.instructions
                            .last()
                            .map_or(0, |(Offset(offset), _)| offset + 1)
                    });
                    Code {
                        max_stack: code.max_stack,
                        max_locals: code.max_locals,
                        length,
                        instructions: code.instructions,
                        exception_table: code.exception_table,
                    }
                });
                self.unit_mut()?.methods.push(method);
            }
            label => match label.strip_suffix(':') {
                Some(offset) => {
                    let offset = parse_number::<usize>(offset, "instruction offset")?;
                    let insn = parse_instruction(&mut operands)?;
                    self.code_mut()?.instructions.push((Offset(offset), insn));
                }
                None => return Err(format!("unknown directive `{}`", label)),
            },
        }
        Ok(())
    }

    fn unit_mut(&mut self) -> Result<&mut Unit, String> {
        self.unit
            .as_mut()
            .ok_or_else(|| String::from("members must come after the `class` declaration"))
    }

    fn code_mut(&mut self) -> Result<&mut PendingCode, String> {
        match &mut self.method {
            Some((_, Some(code))) => Ok(code),
            _ => Err(String::from("instructions and handlers must follow a `code` header")),
        }
    }

    fn finish(self) -> Result<Unit, String> {
        if let Some((method, _)) = self.method {
            return Err(format!("missing `end` for method {}", method.name));
        }
        self.unit
            .ok_or_else(|| String::from("missing `class` declaration"))
    }
}

fn parse_class(operands: &mut Operands) -> Result<Unit, String> {
    let access_flags = operands.access_flags::<ClassAccessFlags>();
    let name: BinaryName = operands.name("class name")?;
    let mut superclass = if name == BinaryName::OBJECT {
        None
    } else {
        Some(BinaryName::OBJECT)
    };
    if operands.eat("extends") {
        superclass = Some(operands.name("superclass name")?);
    }
    let mut unit = Unit::new(name, access_flags, superclass);
    if operands.eat("implements") {
        while !operands.is_empty() {
            unit.interfaces.push(operands.name("interface name")?);
        }
    }
    operands.finish()?;
    Ok(unit)
}

fn parse_field(operands: &mut Operands) -> Result<Field, String> {
    let access_flags = operands.access_flags::<FieldAccessFlags>();
    let name = operands.name("field name")?;
    let descriptor = operands.descriptor("field descriptor")?;
    operands.finish()?;
    Ok(Field {
        name,
        descriptor,
        access_flags,
    })
}

fn parse_method(operands: &mut Operands) -> Result<Method, String> {
    let access_flags = operands.access_flags::<MethodAccessFlags>();
    let name = operands.name("method name")?;
    let descriptor = operands.descriptor("method descriptor")?;
    operands.finish()?;
    Ok(Method {
        name,
        descriptor,
        access_flags,
        code: None,
    })
}

/// `code stack <max_stack> locals <max_locals> [length <length>]`
fn parse_code_header(operands: &mut Operands) -> Result<PendingCode, String> {
    let mut max_stack = None;
    let mut max_locals = None;
    let mut length = None;
    while !operands.is_empty() {
        match operands.next("code attribute")? {
            "stack" => max_stack = Some(operands.number("max stack")?),
            "locals" => max_locals = Some(operands.number("max locals")?),
            "length" => length = Some(operands.number("code length")?),
            other => return Err(format!("unknown code attribute `{}`", other)),
        }
    }
    Ok(PendingCode {
        max_stack: max_stack.ok_or_else(|| String::from("missing `stack` in code header"))?,
        max_locals: max_locals.ok_or_else(|| String::from("missing `locals` in code header"))?,
        length,
        instructions: vec![],
        exception_table: vec![],
    })
}

/// `catch <start> <end> <handler> <class|any>`
fn parse_handler(operands: &mut Operands) -> Result<ExceptionHandler, String> {
    let start = operands.offset()?;
    let end = operands.offset()?;
    let handler = operands.offset()?;
    let catch_type = if operands.eat("any") {
        None
    } else {
        Some(operands.name("catch type")?)
    };
    operands.finish()?;
    Ok(ExceptionHandler {
        start,
        end,
        handler,
        catch_type,
    })
}

/// Cursor over the operands of a directive
struct Operands<'t> {
    tokens: &'t [String],
}

impl<'t> Operands<'t> {
    fn new(tokens: &'t [String]) -> Operands<'t> {
        Operands { tokens }
    }

    fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    fn next(&mut self, what: &str) -> Result<&'t str, String> {
        match self.tokens.split_first() {
            Some((first, rest)) => {
                self.tokens = rest;
                Ok(first.as_str())
            }
            None => Err(format!("missing {}", what)),
        }
    }

    /// Consume the next token if it is the given keyword
    fn eat(&mut self, keyword: &str) -> bool {
        match self.tokens.split_first() {
            Some((first, rest)) if first == keyword => {
                self.tokens = rest;
                true
            }
            _ => false,
        }
    }

    fn finish(&self) -> Result<(), String> {
        match self.tokens.first() {
            None => Ok(()),
            Some(extra) => Err(format!("unexpected operand `{}`", extra)),
        }
    }

    /// Leading access flag keywords
    fn access_flags<F: AccessKeywords + Default + std::ops::BitOrAssign>(&mut self) -> F {
        let mut flags = F::default();
        while let Some(flag) = self.tokens.first().and_then(|tok| F::from_keyword(tok)) {
            flags |= flag;
            self.tokens = &self.tokens[1..];
        }
        flags
    }

    fn name<N: Name>(&mut self, what: &str) -> Result<N, String> {
        N::from_str(self.next(what)?)
    }

    fn descriptor<D: ParseDescriptor>(&mut self, what: &str) -> Result<D, String> {
        let source = self.next(what)?;
        D::parse(source).map_err(|err| format!("invalid {} `{}`: {}", what, source, err))
    }

    fn number<T: FromStr>(&mut self, what: &str) -> Result<T, String> {
        parse_number(self.next(what)?, what)
    }

    fn offset(&mut self) -> Result<Offset, String> {
        self.number("offset").map(Offset)
    }

    fn ref_type(&mut self, what: &str) -> Result<RefType, String> {
        parse_ref_type(self.next(what)?)
    }

    /// `<class>.<name> <descriptor>`
    fn field_ref(&mut self) -> Result<FieldRef, String> {
        let member = self.next("field reference")?;
        let (class, name) = split_member(member)?;
        Ok(FieldRef {
            class,
            name,
            descriptor: self.descriptor("field descriptor")?,
        })
    }

    /// `<class>.<name><descriptor>`
    fn method_ref(&mut self) -> Result<MethodRef, String> {
        let member = self.next("method reference")?;
        let paren = member
            .find('(')
            .ok_or_else(|| format!("method reference `{}` has no descriptor", member))?;
        let (class, name) = split_member(&member[..paren])?;
        let descriptor = parse_method_descriptor(&member[paren..])?;
        Ok(MethodRef {
            class,
            name,
            descriptor,
        })
    }

    /// `<name><descriptor>`
    fn call_site(&mut self) -> Result<InvokeDynamicRef, String> {
        let call_site = self.next("call site")?;
        let paren = call_site
            .find('(')
            .ok_or_else(|| format!("call site `{}` has no descriptor", call_site))?;
        Ok(InvokeDynamicRef {
            name: UnqualifiedName::from_str(&call_site[..paren])?,
            descriptor: parse_method_descriptor(&call_site[paren..])?,
        })
    }

    fn constant(&mut self) -> Result<ConstantData, String> {
        let token = self.next("constant")?;
        if let Some(literal) = token.strip_prefix('"') {
            return Ok(ConstantData::String(literal.to_owned()));
        }
        match token {
            "class" => Ok(ConstantData::Class(self.ref_type("class constant")?)),
            "methodtype" => {
                let descriptor = self.next("method type")?;
                Ok(ConstantData::MethodType(parse_method_descriptor(descriptor)?))
            }
            numeric => parse_numeric_constant(numeric),
        }
    }
}

fn parse_number<T: FromStr>(token: &str, what: &str) -> Result<T, String> {
    token
        .parse()
        .map_err(|_| format!("invalid {} `{}`", what, token))
}

/// Class name or array descriptor
fn parse_ref_type(token: &str) -> Result<RefType, String> {
    if token.starts_with('[') {
        RefType::parse(token).map_err(|err| format!("invalid array type `{}`: {}", token, err))
    } else {
        BinaryName::from_str(token).map(RefType::Object)
    }
}

fn parse_method_descriptor(token: &str) -> Result<MethodDescriptor, String> {
    MethodDescriptor::parse(token)
        .map_err(|err| format!("invalid method descriptor `{}`: {}", token, err))
}

/// Split `java/lang/String.length` into its class and member name
fn split_member(member: &str) -> Result<(BinaryName, UnqualifiedName), String> {
    let (class, name) = member
        .rsplit_once('.')
        .ok_or_else(|| format!("member reference `{}` has no class", member))?;
    Ok((BinaryName::from_str(class)?, UnqualifiedName::from_str(name)?))
}

/// `42`, `42L`, `1.5f`, `1.5`, or `1.5d`
fn parse_numeric_constant(token: &str) -> Result<ConstantData, String> {
    if let Some(long) = token.strip_suffix(&['L', 'l'][..]) {
        parse_number(long, "long constant").map(ConstantData::Long)
    } else if let Some(float) = token.strip_suffix(&['F', 'f'][..]) {
        parse_number(float, "float constant").map(ConstantData::Float)
    } else if let Some(double) = token.strip_suffix(&['D', 'd'][..]) {
        parse_number(double, "double constant").map(ConstantData::Double)
    } else if token.contains(&['.', 'e', 'E'][..]) {
        parse_number(token, "double constant").map(ConstantData::Double)
    } else {
        parse_number(token, "constant").map(ConstantData::Integer)
    }
}

fn parse_base_type(token: &str) -> Result<BaseType, String> {
    Ok(match token {
        "boolean" => BaseType::Boolean,
        "byte" => BaseType::Byte,
        "char" => BaseType::Char,
        "short" => BaseType::Short,
        "int" => BaseType::Int,
        "long" => BaseType::Long,
        "float" => BaseType::Float,
        "double" => BaseType::Double,
        other => return Err(format!("invalid array element type `{}`", other)),
    })
}

/// Instructions without operands
fn nullary_instruction(mnemonic: &str) -> Option<Instruction> {
    use Instruction::*;
    Some(match mnemonic {
        "nop" => Nop,
        "aconst_null" => AConstNull,
        "iconst_m1" => IConstM1,
        "iconst_0" => IConst0,
        "iconst_1" => IConst1,
        "iconst_2" => IConst2,
        "iconst_3" => IConst3,
        "iconst_4" => IConst4,
        "iconst_5" => IConst5,
        "lconst_0" => LConst0,
        "lconst_1" => LConst1,
        "fconst_0" => FConst0,
        "fconst_1" => FConst1,
        "fconst_2" => FConst2,
        "dconst_0" => DConst0,
        "dconst_1" => DConst1,
        "iaload" => IALoad,
        "laload" => LALoad,
        "faload" => FALoad,
        "daload" => DALoad,
        "aaload" => AALoad,
        "baload" => BALoad,
        "caload" => CALoad,
        "saload" => SALoad,
        "iastore" => IAStore,
        "lastore" => LAStore,
        "fastore" => FAStore,
        "dastore" => DAStore,
        "aastore" => AAStore,
        "bastore" => BAStore,
        "castore" => CAStore,
        "sastore" => SAStore,
        "pop" => Pop,
        "pop2" => Pop2,
        "dup" => Dup,
        "dup_x1" => DupX1,
        "dup_x2" => DupX2,
        "dup2" => Dup2,
        "dup2_x1" => Dup2X1,
        "dup2_x2" => Dup2X2,
        "swap" => Swap,
        "iadd" => IAdd,
        "ladd" => LAdd,
        "fadd" => FAdd,
        "dadd" => DAdd,
        "isub" => ISub,
        "lsub" => LSub,
        "fsub" => FSub,
        "dsub" => DSub,
        "imul" => IMul,
        "lmul" => LMul,
        "fmul" => FMul,
        "dmul" => DMul,
        "idiv" => IDiv,
        "ldiv" => LDiv,
        "fdiv" => FDiv,
        "ddiv" => DDiv,
        "irem" => IRem,
        "lrem" => LRem,
        "frem" => FRem,
        "drem" => DRem,
        "ineg" => INeg,
        "lneg" => LNeg,
        "fneg" => FNeg,
        "dneg" => DNeg,
        "ishl" => ISh(ShiftType::Left),
        "lshl" => LSh(ShiftType::Left),
        "ishr" => ISh(ShiftType::ArithmeticRight),
        "lshr" => LSh(ShiftType::ArithmeticRight),
        "iushr" => ISh(ShiftType::LogicalRight),
        "lushr" => LSh(ShiftType::LogicalRight),
        "iand" => IAnd,
        "land" => LAnd,
        "ior" => IOr,
        "lor" => LOr,
        "ixor" => IXor,
        "lxor" => LXor,
        "i2l" => I2L,
        "i2f" => I2F,
        "i2d" => I2D,
        "l2i" => L2I,
        "l2f" => L2F,
        "l2d" => L2D,
        "f2i" => F2I,
        "f2l" => F2L,
        "f2d" => F2D,
        "d2i" => D2I,
        "d2l" => D2L,
        "d2f" => D2F,
        "i2b" => I2B,
        "i2c" => I2C,
        "i2s" => I2S,
        "lcmp" => LCmp,
        "fcmpl" => FCmp(CompareMode::L),
        "fcmpg" => FCmp(CompareMode::G),
        "dcmpl" => DCmp(CompareMode::L),
        "dcmpg" => DCmp(CompareMode::G),
        "arraylength" => ArrayLength,
        "monitorenter" => MonitorEnter,
        "monitorexit" => MonitorExit,
        _ => return None,
    })
}

/// Branch instructions without operands
fn nullary_branch(mnemonic: &str) -> Option<BranchInstruction> {
    use BranchInstruction::*;
    Some(match mnemonic {
        "ireturn" => IReturn,
        "lreturn" => LReturn,
        "freturn" => FReturn,
        "dreturn" => DReturn,
        "areturn" => AReturn,
        "return" => Return,
        "athrow" => AThrow,
        _ => return None,
    })
}

/// Constructor of an instruction taking a local variable index
fn local_instruction(mnemonic: &str) -> Option<fn(u16) -> Instruction> {
    use Instruction::*;
    let make: fn(u16) -> Instruction = match mnemonic {
        "iload" => ILoad,
        "lload" => LLoad,
        "fload" => FLoad,
        "dload" => DLoad,
        "aload" => ALoad,
        "istore" => IStore,
        "lstore" => LStore,
        "fstore" => FStore,
        "dstore" => DStore,
        "astore" => AStore,
        _ => return None,
    };
    Some(make)
}

fn ord_comparison(suffix: &str) -> Option<OrdComparison> {
    Some(match suffix {
        "eq" => OrdComparison::EQ,
        "ne" => OrdComparison::NE,
        "lt" => OrdComparison::LT,
        "ge" => OrdComparison::GE,
        "gt" => OrdComparison::GT,
        "le" => OrdComparison::LE,
        _ => return None,
    })
}

fn parse_instruction(operands: &mut Operands) -> Result<Insn, String> {
    use BranchInstruction::*;
    use Instruction::*;

    let mut mnemonic = operands.next("mnemonic")?;
    if mnemonic == "wide" {
        mnemonic = operands.next("widened mnemonic")?;
    }

    if let Some(insn) = nullary_instruction(mnemonic) {
        operands.finish()?;
        return Ok(Insn::Regular(insn));
    }
    if let Some(insn) = nullary_branch(mnemonic) {
        operands.finish()?;
        return Ok(Insn::Branch(insn));
    }

    // Short forms such as `aload_0`
    if let Some((base, n)) = mnemonic.rsplit_once('_') {
        if let (Some(make), Ok(idx @ 0..=3)) = (local_instruction(base), n.parse::<u16>()) {
            operands.finish()?;
            return Ok(Insn::Regular(make(idx)));
        }
    }

    if let Some(make) = local_instruction(mnemonic) {
        let idx = operands.number("local variable index")?;
        operands.finish()?;
        return Ok(Insn::Regular(make(idx)));
    }

    let insn: Insn = match mnemonic {
        "bipush" => BiPush(operands.number("byte")?).into(),
        "sipush" => SiPush(operands.number("short")?).into(),
        "ldc" | "ldc_w" => Ldc(operands.constant()?).into(),
        "ldc2_w" => Ldc2(operands.constant()?).into(),
        "iinc" => {
            let idx = operands.number("local variable index")?;
            IInc(idx, operands.number("increment")?).into()
        }
        "getstatic" => GetStatic(operands.field_ref()?).into(),
        "putstatic" => PutStatic(operands.field_ref()?).into(),
        "getfield" => GetField(operands.field_ref()?).into(),
        "putfield" => PutField(operands.field_ref()?).into(),
        "invokevirtual" => Invoke(InvokeType::Virtual, operands.method_ref()?).into(),
        "invokespecial" => Invoke(InvokeType::Special, operands.method_ref()?).into(),
        "invokestatic" => Invoke(InvokeType::Static, operands.method_ref()?).into(),
        "invokeinterface" => {
            let method = operands.method_ref()?;
            let count = if operands.is_empty() {
                u8::try_from(method.descriptor.parameter_slots(true))
                    .map_err(|_| String::from("too many interface call arguments"))?
            } else {
                operands.number("argument count")?
            };
            Invoke(InvokeType::Interface(count), method).into()
        }
        "invokedynamic" => InvokeDynamic(operands.call_site()?).into(),
        "new" => New(operands.ref_type("class")?).into(),
        "newarray" => NewArray(parse_base_type(operands.next("element type")?)?).into(),
        "anewarray" => ANewArray(operands.ref_type("element type")?).into(),
        "multianewarray" => {
            let array_type = operands.ref_type("array type")?;
            MultiANewArray(array_type, operands.number("dimensions")?).into()
        }
        "checkcast" => CheckCast(operands.ref_type("type")?).into(),
        "instanceof" => InstanceOf(operands.ref_type("type")?).into(),

        "ifnull" => IfNull(EqComparison::EQ, operands.offset()?).into(),
        "ifnonnull" => IfNull(EqComparison::NE, operands.offset()?).into(),
        "if_acmpeq" => IfACmp(EqComparison::EQ, operands.offset()?).into(),
        "if_acmpne" => IfACmp(EqComparison::NE, operands.offset()?).into(),
        "goto" | "goto_w" => Goto(operands.offset()?).into(),
        "tableswitch" => {
            let low = operands.number("low key")?;
            let default = operands.offset()?;
            let mut targets = vec![];
            while !operands.is_empty() {
                targets.push(operands.offset()?);
            }
            TableSwitch {
                default,
                low,
                targets,
            }
            .into()
        }
        "lookupswitch" => {
            let default = operands.offset()?;
            let mut targets = vec![];
            while !operands.is_empty() {
                let pair = operands.next("switch case")?;
                let (key, target) = pair
                    .split_once(':')
                    .ok_or_else(|| format!("switch case `{}` is not `key:target`", pair))?;
                targets.push((
                    parse_number(key, "switch key")?,
                    Offset(parse_number(target, "switch target")?),
                ));
            }
            targets.sort_by_key(|(key, _)| *key);
            LookupSwitch { default, targets }.into()
        }
        "jsr" | "jsr_w" | "ret" => {
            return Err(format!("subroutines are not supported (`{}`)", mnemonic))
        }

        other => {
            if let Some(cmp) = other.strip_prefix("if_icmp").and_then(ord_comparison) {
                IfICmp(cmp, operands.offset()?).into()
            } else if let Some(cmp) = other.strip_prefix("if").and_then(ord_comparison) {
                If(cmp, operands.offset()?).into()
            } else {
                return Err(format!("unknown instruction `{}`", other));
            }
        }
    };
    operands.finish()?;
    Ok(insn)
}
