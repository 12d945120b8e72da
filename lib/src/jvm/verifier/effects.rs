use super::{check_assignable, Frame, LocalKind, UninitializedRefType, VerificationType};
use super::VerifierErrorKind;
use crate::jvm::class_graph::TypeOracle;
use crate::jvm::code::{BranchInstruction, ConstantData, Insn, Instruction, InvokeType};
use crate::jvm::model::{Method, Unit};
use crate::jvm::{BaseType, BinaryName, FieldType, RefType, UnqualifiedName};
use crate::util::{Offset, Width};
use VerificationType::{Null, Object};

/// Everything about the method being verified that instruction effects depend on
pub struct MethodContext<'a> {
    /// Class declaring the method
    pub this_class: BinaryName,

    /// Superclass of the declaring class
    pub superclass: Option<BinaryName>,

    /// Is the method an instance initialization method?
    pub is_constructor: bool,

    /// Declared return type (`None` for `void`)
    pub return_type: Option<FieldType>,

    pub oracle: &'a dyn TypeOracle,
}

impl<'a> MethodContext<'a> {
    pub fn new(unit: &Unit, method: &Method, oracle: &'a dyn TypeOracle) -> MethodContext<'a> {
        MethodContext {
            this_class: unit.name.clone(),
            superclass: unit.superclass.clone(),
            is_constructor: method.is_constructor(),
            return_type: method.descriptor.return_type.clone(),
            oracle,
        }
    }
}

impl Frame {
    /// Compute the frame after executing an instruction
    ///
    /// For instructions which never fall through (returns, `athrow`, unconditional jumps), the
    /// output frame is the one passed along jump edges.
    pub fn apply(
        &self,
        insn: &Insn,
        offset: Offset,
        ctx: &MethodContext,
    ) -> Result<Frame, VerifierErrorKind> {
        let mut frame = self.clone();
        match insn {
            Insn::Regular(insn) => verify_instruction(&mut frame, insn, offset, ctx)?,
            Insn::Branch(insn) => verify_branch_instruction(&mut frame, insn, ctx)?,
        }
        Ok(frame)
    }
}

fn verify_instruction(
    frame: &mut Frame,
    insn: &Instruction,
    insn_offset: Offset,
    ctx: &MethodContext,
) -> Result<(), VerifierErrorKind> {
    use Instruction::*;
    use VerificationType::*;

    let oracle = ctx.oracle;

    match insn {
        Nop => (),
        AConstNull => frame.push(Null)?,
        IConstM1 | IConst0 | IConst1 | IConst2 | IConst3 | IConst4 | IConst5 => {
            frame.push(Integer)?;
        }
        LConst0 | LConst1 => frame.push(Long)?,
        FConst0 | FConst1 | FConst2 => frame.push(Float)?,
        DConst0 | DConst1 => frame.push(Double)?,
        BiPush(_) | SiPush(_) => frame.push(Integer)?,
        Ldc(constant) => {
            let typ = constant_type(constant);
            if typ.width() != 1 {
                return Err(VerifierErrorKind::type_violation("a category 1 constant", typ));
            }
            frame.push(typ)?;
        }
        Ldc2(constant) => {
            let typ = constant_type(constant);
            if typ.width() != 2 {
                return Err(VerifierErrorKind::type_violation("a category 2 constant", typ));
            }
            frame.push(typ)?;
        }

        ILoad(idx) => {
            frame.load(*idx, LocalKind::Int)?;
            frame.push(Integer)?;
        }
        LLoad(idx) => {
            frame.load(*idx, LocalKind::Long)?;
            frame.push(Long)?;
        }
        FLoad(idx) => {
            frame.load(*idx, LocalKind::Float)?;
            frame.push(Float)?;
        }
        DLoad(idx) => {
            frame.load(*idx, LocalKind::Double)?;
            frame.push(Double)?;
        }
        ALoad(idx) => {
            let typ = frame.load(*idx, LocalKind::Reference)?;
            frame.push(typ)?;
        }

        IALoad => {
            frame.pop_expecting_type(&Integer, oracle)?;
            pop_primitive_array(frame, &[BaseType::Int])?;
            frame.push(Integer)?;
        }
        LALoad => {
            frame.pop_expecting_type(&Integer, oracle)?;
            pop_primitive_array(frame, &[BaseType::Long])?;
            frame.push(Long)?;
        }
        FALoad => {
            frame.pop_expecting_type(&Integer, oracle)?;
            pop_primitive_array(frame, &[BaseType::Float])?;
            frame.push(Float)?;
        }
        DALoad => {
            frame.pop_expecting_type(&Integer, oracle)?;
            pop_primitive_array(frame, &[BaseType::Double])?;
            frame.push(Double)?;
        }
        AALoad => {
            frame.pop_expecting_type(&Integer, oracle)?;
            let element_type = match pop_reference_array(frame)? {
                None => Null,
                Some(component_type) => VerificationType::from(component_type),
            };
            frame.push(element_type)?;
        }
        BALoad => {
            frame.pop_expecting_type(&Integer, oracle)?;
            pop_primitive_array(frame, &[BaseType::Byte, BaseType::Boolean])?;
            frame.push(Integer)?;
        }
        CALoad => {
            frame.pop_expecting_type(&Integer, oracle)?;
            pop_primitive_array(frame, &[BaseType::Char])?;
            frame.push(Integer)?;
        }
        SALoad => {
            frame.pop_expecting_type(&Integer, oracle)?;
            pop_primitive_array(frame, &[BaseType::Short])?;
            frame.push(Integer)?;
        }

        IStore(idx) => {
            frame.pop_expecting_type(&Integer, oracle)?;
            frame.store(*idx, Integer)?;
        }
        FStore(idx) => {
            frame.pop_expecting_type(&Float, oracle)?;
            frame.store(*idx, Float)?;
        }
        LStore(idx) => {
            frame.pop_expecting_type(&Long, oracle)?;
            frame.store(*idx, Long)?;
        }
        DStore(idx) => {
            frame.pop_expecting_type(&Double, oracle)?;
            frame.store(*idx, Double)?;
        }
        AStore(idx) => {
            // Uninitialized objects may be stored in locals
            let popped_type = frame.pop()?;
            if !popped_type.is_reference() {
                return Err(VerifierErrorKind::type_violation("a reference", popped_type));
            }
            frame.store(*idx, popped_type)?;
        }

        IAStore => {
            frame.pop_expecting_type(&Integer, oracle)?;
            frame.pop_expecting_type(&Integer, oracle)?;
            pop_primitive_array(frame, &[BaseType::Int])?;
        }
        LAStore => {
            frame.pop_expecting_type(&Long, oracle)?;
            frame.pop_expecting_type(&Integer, oracle)?;
            pop_primitive_array(frame, &[BaseType::Long])?;
        }
        FAStore => {
            frame.pop_expecting_type(&Float, oracle)?;
            frame.pop_expecting_type(&Integer, oracle)?;
            pop_primitive_array(frame, &[BaseType::Float])?;
        }
        DAStore => {
            frame.pop_expecting_type(&Double, oracle)?;
            frame.pop_expecting_type(&Integer, oracle)?;
            pop_primitive_array(frame, &[BaseType::Double])?;
        }
        AAStore => {
            // Element compatibility is only known at runtime (array covariance)
            pop_initialized_reference(frame)?;
            frame.pop_expecting_type(&Integer, oracle)?;
            pop_reference_array(frame)?;
        }
        BAStore => {
            frame.pop_expecting_type(&Integer, oracle)?;
            frame.pop_expecting_type(&Integer, oracle)?;
            pop_primitive_array(frame, &[BaseType::Byte, BaseType::Boolean])?;
        }
        CAStore => {
            frame.pop_expecting_type(&Integer, oracle)?;
            frame.pop_expecting_type(&Integer, oracle)?;
            pop_primitive_array(frame, &[BaseType::Char])?;
        }
        SAStore => {
            frame.pop_expecting_type(&Integer, oracle)?;
            frame.pop_expecting_type(&Integer, oracle)?;
            pop_primitive_array(frame, &[BaseType::Short])?;
        }

        Pop => {
            frame.pop_expecting_width(1)?;
        }

        Pop2 => {
            let arg1 = frame.pop()?;
            // Form 1 (two category 1 values)
            if arg1.width() == 1 {
                frame.pop_expecting_width(1)?;
            }
        }

        Dup => {
            let arg1 = frame.pop_expecting_width(1)?;
            frame.push(arg1.clone())?;
            frame.push(arg1)?;
        }

        DupX1 => {
            let arg1 = frame.pop_expecting_width(1)?;
            let arg2 = frame.pop_expecting_width(1)?;
            frame.push(arg1.clone())?;
            frame.push(arg2)?;
            frame.push(arg1)?;
        }

        DupX2 => {
            let arg1 = frame.pop_expecting_width(1)?;
            let arg2 = frame.pop()?;
            if arg2.width() == 1 {
                // Form 1
                let arg3 = frame.pop_expecting_width(1)?;
                frame.push(arg1.clone())?;
                frame.push(arg3)?;
                frame.push(arg2)?;
                frame.push(arg1)?;
            } else {
                // Form 2
                frame.push(arg1.clone())?;
                frame.push(arg2)?;
                frame.push(arg1)?;
            }
        }

        Dup2 => {
            let arg1 = frame.pop()?;
            if arg1.width() == 1 {
                // Form 1
                let arg2 = frame.pop_expecting_width(1)?;
                frame.push(arg2.clone())?;
                frame.push(arg1.clone())?;
                frame.push(arg2)?;
                frame.push(arg1)?;
            } else {
                // Form 2
                frame.push(arg1.clone())?;
                frame.push(arg1)?;
            }
        }

        Dup2X1 => {
            let arg1 = frame.pop()?;
            let arg2 = frame.pop_expecting_width(1)?;
            if arg1.width() == 1 {
                // Form 1
                let arg3 = frame.pop_expecting_width(1)?;
                frame.push(arg2.clone())?;
                frame.push(arg1.clone())?;
                frame.push(arg3)?;
                frame.push(arg2)?;
                frame.push(arg1)?;
            } else {
                // Form 2
                frame.push(arg1.clone())?;
                frame.push(arg2)?;
                frame.push(arg1)?;
            }
        }

        Dup2X2 => {
            let arg1 = frame.pop()?;
            if arg1.width() == 1 {
                let arg2 = frame.pop_expecting_width(1)?;
                let arg3 = frame.pop()?;
                if arg3.width() == 1 {
                    // Form 1
                    let arg4 = frame.pop_expecting_width(1)?;
                    frame.push(arg2.clone())?;
                    frame.push(arg1.clone())?;
                    frame.push(arg4)?;
                    frame.push(arg3)?;
                    frame.push(arg2)?;
                    frame.push(arg1)?;
                } else {
                    // Form 3
                    frame.push(arg2.clone())?;
                    frame.push(arg1.clone())?;
                    frame.push(arg3)?;
                    frame.push(arg2)?;
                    frame.push(arg1)?;
                }
            } else {
                let arg2 = frame.pop()?;
                if arg2.width() == 1 {
                    // Form 2
                    let arg3 = frame.pop_expecting_width(1)?;
                    frame.push(arg1.clone())?;
                    frame.push(arg3)?;
                    frame.push(arg2)?;
                    frame.push(arg1)?;
                } else {
                    // Form 4
                    frame.push(arg1.clone())?;
                    frame.push(arg2)?;
                    frame.push(arg1)?;
                }
            }
        }

        Swap => {
            let arg1 = frame.pop_expecting_width(1)?;
            let arg2 = frame.pop_expecting_width(1)?;
            frame.push(arg1)?;
            frame.push(arg2)?;
        }

        IAdd | ISub | IDiv | IMul | IRem | IAnd | IOr | IXor | ISh(_) => {
            frame.pop_expecting_type(&Integer, oracle)?;
            frame.pop_expecting_type(&Integer, oracle)?;
            frame.push(Integer)?;
        }

        LAdd | LSub | LDiv | LMul | LRem | LAnd | LOr | LXor => {
            frame.pop_expecting_type(&Long, oracle)?;
            frame.pop_expecting_type(&Long, oracle)?;
            frame.push(Long)?;
        }

        FAdd | FSub | FDiv | FMul | FRem => {
            frame.pop_expecting_type(&Float, oracle)?;
            frame.pop_expecting_type(&Float, oracle)?;
            frame.push(Float)?;
        }

        DAdd | DSub | DDiv | DMul | DRem => {
            frame.pop_expecting_type(&Double, oracle)?;
            frame.pop_expecting_type(&Double, oracle)?;
            frame.push(Double)?;
        }

        INeg | I2B | I2C | I2S => {
            frame.pop_expecting_type(&Integer, oracle)?;
            frame.push(Integer)?;
        }

        LNeg => {
            frame.pop_expecting_type(&Long, oracle)?;
            frame.push(Long)?;
        }

        FNeg => {
            frame.pop_expecting_type(&Float, oracle)?;
            frame.push(Float)?;
        }

        DNeg => {
            frame.pop_expecting_type(&Double, oracle)?;
            frame.push(Double)?;
        }

        LSh(_) => {
            frame.pop_expecting_type(&Integer, oracle)?;
            frame.pop_expecting_type(&Long, oracle)?;
            frame.push(Long)?;
        }

        IInc(idx, _) => {
            frame.load(*idx, LocalKind::Int)?;
        }

        I2L | F2L | D2L => {
            frame.pop_expecting_type(&conversion_source(insn), oracle)?;
            frame.push(Long)?;
        }
        I2F | L2F | D2F => {
            frame.pop_expecting_type(&conversion_source(insn), oracle)?;
            frame.push(Float)?;
        }
        I2D | L2D | F2D => {
            frame.pop_expecting_type(&conversion_source(insn), oracle)?;
            frame.push(Double)?;
        }
        L2I | F2I | D2I => {
            frame.pop_expecting_type(&conversion_source(insn), oracle)?;
            frame.push(Integer)?;
        }

        LCmp => {
            frame.pop_expecting_type(&Long, oracle)?;
            frame.pop_expecting_type(&Long, oracle)?;
            frame.push(Integer)?;
        }
        FCmp(_) => {
            frame.pop_expecting_type(&Float, oracle)?;
            frame.pop_expecting_type(&Float, oracle)?;
            frame.push(Integer)?;
        }
        DCmp(_) => {
            frame.pop_expecting_type(&Double, oracle)?;
            frame.pop_expecting_type(&Double, oracle)?;
            frame.push(Integer)?;
        }

        GetStatic(field) => {
            frame.push(VerificationType::from(&field.descriptor))?;
        }
        PutStatic(field) => {
            frame.pop_expecting_type(&VerificationType::from(&field.descriptor), oracle)?;
        }

        GetField(field) => {
            frame.pop_expecting_type(&VerificationType::class(field.class.clone()), oracle)?;
            frame.push(VerificationType::from(&field.descriptor))?;
        }
        PutField(field) => {
            frame.pop_expecting_type(&VerificationType::from(&field.descriptor), oracle)?;
            let receiver = frame.pop()?;

            // Fields of the current class may be set before the superclass constructor runs
            let initializing_own_field =
                receiver == UninitializedThis && field.class == ctx.this_class;
            if !initializing_own_field {
                let expected = VerificationType::class(field.class.clone());
                check_assignable(&receiver, &expected, oracle)?;
            }
        }

        Invoke(invoke_type, method) => {
            let desc = &method.descriptor;

            // Check that all the arguments match
            for expected_arg_type in desc.parameters.iter().rev() {
                frame.pop_expecting_type(&VerificationType::from(expected_arg_type), oracle)?;
            }

            if *invoke_type == InvokeType::Special && method.name == UnqualifiedName::INIT {
                // Initialize
                let receiver = frame.pop()?;
                let initialized = match &receiver {
                    UninitializedThis => {
                        let calls_own_or_super_init = method.class == ctx.this_class
                            || ctx.superclass.as_ref() == Some(&method.class);
                        if !calls_own_or_super_init {
                            let expected = match &ctx.superclass {
                                Some(superclass) => {
                                    format!("{} or {}", ctx.this_class, superclass)
                                }
                                None => ctx.this_class.to_string(),
                            };
                            return Err(VerifierErrorKind::type_violation(expected, receiver));
                        }
                        frame.this_uninitialized = false;
                        VerificationType::class(ctx.this_class.clone())
                    }

                    Uninitialized(uninitialized) => {
                        if uninitialized.class != method.class {
                            return Err(VerifierErrorKind::type_violation(
                                format!("uninitialized {}", method.class),
                                receiver,
                            ));
                        }
                        VerificationType::class(uninitialized.class.clone())
                    }

                    _ => {
                        return Err(VerifierErrorKind::type_violation(
                            "an uninitialized object",
                            receiver,
                        ))
                    }
                };
                frame.replace_all(&receiver, &initialized);
            } else {
                // Pop off the receiver type
                if !matches!(invoke_type, InvokeType::Static) {
                    let expected = VerificationType::class(method.class.clone());
                    frame.pop_expecting_type(&expected, oracle)?;
                }

                // Push the return type
                if let Some(return_type) = &desc.return_type {
                    frame.push(VerificationType::from(return_type))?;
                }
            }
        }

        InvokeDynamic(call_site) => {
            // Check that all the arguments match
            for expected_arg_type in call_site.descriptor.parameters.iter().rev() {
                frame.pop_expecting_type(&VerificationType::from(expected_arg_type), oracle)?;
            }

            // Push the return type
            if let Some(return_type) = &call_site.descriptor.return_type {
                frame.push(VerificationType::from(return_type))?;
            }
        }

        New(ref_type) => {
            let class = match ref_type {
                RefType::Object(class) => class.clone(),
                _ => {
                    return Err(VerifierErrorKind::type_violation(
                        "a class type",
                        Object(ref_type.clone()),
                    ))
                }
            };
            let uninitialized = Uninitialized(UninitializedRefType {
                class,
                offset: insn_offset,
            });

            // The object from a previous run of this `new` must not still be in use
            if frame.stack.iter().any(|(_, _, typ)| typ == &uninitialized) {
                return Err(VerifierErrorKind::UninitializedUse(uninitialized));
            }
            for local in &mut frame.locals {
                if local == &uninitialized {
                    *local = Top;
                }
            }
            frame.push(uninitialized)?;
        }
        NewArray(base_type) => {
            frame.pop_expecting_type(&Integer, oracle)?;
            frame.push(Object(RefType::array(FieldType::Base(*base_type))))?;
        }
        ANewArray(ref_type) => {
            frame.pop_expecting_type(&Integer, oracle)?;
            frame.push(Object(RefType::array(FieldType::Ref(ref_type.clone()))))?;
        }
        MultiANewArray(ref_type, dimensions) => {
            for _ in 0..*dimensions {
                frame.pop_expecting_type(&Integer, oracle)?;
            }
            frame.push(Object(ref_type.clone()))?;
        }
        ArrayLength => {
            let array_type = pop_initialized_reference(frame)?;
            match array_type {
                Null | Object(RefType::PrimitiveArray(_) | RefType::ObjectArray(_)) => (),
                _ => return Err(VerifierErrorKind::type_violation("an array", array_type)),
            }
            frame.push(Integer)?;
        }

        CheckCast(ref_type) => {
            pop_initialized_reference(frame)?;
            frame.push(Object(ref_type.clone()))?;
        }
        InstanceOf(_) => {
            pop_initialized_reference(frame)?;
            frame.push(Integer)?;
        }
        MonitorEnter | MonitorExit => {
            pop_initialized_reference(frame)?;
        }
    }

    Ok(())
}

fn verify_branch_instruction(
    frame: &mut Frame,
    insn: &BranchInstruction,
    ctx: &MethodContext,
) -> Result<(), VerifierErrorKind> {
    use BranchInstruction::*;
    use VerificationType::*;

    let oracle = ctx.oracle;

    match insn {
        If(_, _) => {
            frame.pop_expecting_type(&Integer, oracle)?;
        }
        IfICmp(_, _) => {
            frame.pop_expecting_type(&Integer, oracle)?;
            frame.pop_expecting_type(&Integer, oracle)?;
        }
        IfACmp(_, _) => {
            pop_initialized_reference(frame)?;
            pop_initialized_reference(frame)?;
        }
        IfNull(_, _) => {
            pop_initialized_reference(frame)?;
        }
        Goto(_) => (),
        TableSwitch { .. } | LookupSwitch { .. } => {
            frame.pop_expecting_type(&Integer, oracle)?;
        }
        IReturn => {
            frame.pop_expecting_type(&Integer, oracle)?;
            check_return_type(ctx, Integer)?;
        }
        LReturn => {
            frame.pop_expecting_type(&Long, oracle)?;
            check_return_type(ctx, Long)?;
        }
        FReturn => {
            frame.pop_expecting_type(&Float, oracle)?;
            check_return_type(ctx, Float)?;
        }
        DReturn => {
            frame.pop_expecting_type(&Double, oracle)?;
            check_return_type(ctx, Double)?;
        }
        AReturn => {
            let atype = frame.pop()?;
            match &ctx.return_type {
                Some(ret_type @ FieldType::Ref(_)) => {
                    check_assignable(&atype, &VerificationType::from(ret_type), oracle)?;
                }
                _ => check_return_type(ctx, atype)?,
            }
        }
        Return => {
            if let Some(ret_type) = &ctx.return_type {
                return Err(VerifierErrorKind::type_violation(
                    format!("a return value of type {}", ret_type),
                    Top,
                ));
            }
            if ctx.is_constructor && frame.this_uninitialized {
                return Err(VerifierErrorKind::UninitializedUse(UninitializedThis));
            }
        }
        AThrow => {
            let expected = VerificationType::class(BinaryName::THROWABLE);
            let atype = frame.pop_expecting_type(&expected, oracle)?;
            frame.stack.clear();
            frame.push(atype)?;
        }
    }

    Ok(())
}

/// Check that a primitive return instruction matches the declared return type
fn check_return_type(ctx: &MethodContext, found: VerificationType) -> Result<(), VerifierErrorKind> {
    match &ctx.return_type {
        Some(ret_type) if VerificationType::from(ret_type) == found => Ok(()),
        Some(ret_type) => Err(VerifierErrorKind::type_violation(ret_type, found)),
        None => Err(VerifierErrorKind::type_violation("no return value", found)),
    }
}

/// Type of the value `ldc` and `ldc2_w` push
fn constant_type(constant: &ConstantData) -> VerificationType {
    match constant {
        ConstantData::Integer(_) => VerificationType::Integer,
        ConstantData::Float(_) => VerificationType::Float,
        ConstantData::Long(_) => VerificationType::Long,
        ConstantData::Double(_) => VerificationType::Double,
        ConstantData::String(_) => VerificationType::class(BinaryName::STRING),
        ConstantData::Class(_) => VerificationType::class(BinaryName::CLASS),
        ConstantData::MethodType(_) => VerificationType::class(BinaryName::METHODTYPE),
    }
}

/// Operand type of a primitive conversion
fn conversion_source(insn: &Instruction) -> VerificationType {
    use Instruction::*;
    match insn {
        L2I | L2F | L2D => VerificationType::Long,
        F2I | F2L | F2D => VerificationType::Float,
        D2I | D2L | D2F => VerificationType::Double,
        _ => VerificationType::Integer,
    }
}

/// Pop a reference to an object which has already been initialized (or `null`)
fn pop_initialized_reference(frame: &mut Frame) -> Result<VerificationType, VerifierErrorKind> {
    let typ = frame.pop()?;
    if typ.is_uninitialized() {
        Err(VerifierErrorKind::UninitializedUse(typ))
    } else if !typ.is_reference() {
        Err(VerifierErrorKind::type_violation("a reference", typ))
    } else {
        Ok(typ)
    }
}

/// Pop a one-dimensional array of one of the given primitive types (or `null`)
fn pop_primitive_array(frame: &mut Frame, accepted: &[BaseType]) -> Result<(), VerifierErrorKind> {
    let typ = pop_initialized_reference(frame)?;
    match &typ {
        Null => Ok(()),
        Object(RefType::PrimitiveArray(arr))
            if arr.additional_dimensions == 0 && accepted.contains(&arr.element_type) =>
        {
            Ok(())
        }
        _ => {
            let expected = accepted
                .iter()
                .map(|base_type| RefType::array(FieldType::Base(*base_type)).to_string())
                .collect::<Vec<_>>()
                .join(" or ");
            Err(VerifierErrorKind::type_violation(expected, typ))
        }
    }
}

/// Pop an array whose components are references, returning the component type (`None` if the
/// array is `null`)
fn pop_reference_array(
    frame: &mut Frame,
) -> Result<Option<FieldType>, VerifierErrorKind> {
    let typ = pop_initialized_reference(frame)?;
    match &typ {
        Null => Ok(None),
        Object(ref_type @ (RefType::ObjectArray(_) | RefType::PrimitiveArray(_))) => {
            match ref_type.component_type() {
                Some(component @ FieldType::Ref(_)) => Ok(Some(component)),
                _ => Err(VerifierErrorKind::type_violation("an array of references", typ)),
            }
        }
        _ => Err(VerifierErrorKind::type_violation("an array of references", typ)),
    }
}
