//! Conversion verdicts and the native bridge conversion rules.
//!
//! The host compiler answers "can A convert to B?" through a
//! [`ConversionContext`]. Bridge types add their own rules on top through
//! [`Type::can_convert_to`] and [`Type::can_convert_from`]; a host context is
//! expected to consult those for native types.

use serde::{Deserialize, Serialize};

use crate::types::{FloatPrecision, NativePointerType, Signedness, StructValueType, Type};

/// Verdict of a conversion check. Ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Conversion {
    /// Lossless; may be applied implicitly.
    Safe,
    /// May lose information.
    Unsafe,
    /// Not convertible. A normal negative answer, not an error.
    NoConversion,
}

impl Conversion {
    /// Whether any conversion exists.
    pub fn is_convertible(&self) -> bool {
        !matches!(self, Conversion::NoConversion)
    }

    /// The better of two verdicts.
    pub fn best(self, other: Conversion) -> Conversion {
        self.min(other)
    }
}

impl std::fmt::Display for Conversion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Conversion::Safe => write!(f, "safe"),
            Conversion::Unsafe => write!(f, "unsafe"),
            Conversion::NoConversion => write!(f, "no-conversion"),
        }
    }
}

/// Host capability answering whether one type converts to another.
pub trait ConversionContext {
    fn can_convert(&self, from: &Type, to: &Type) -> Conversion;
}

impl StructValueType {
    /// Struct values only widen to the canonical opaque pointer.
    pub fn can_convert_to(&self, other: &Type) -> Conversion {
        if *other == Type::VoidPtr {
            Conversion::Safe
        } else {
            Conversion::NoConversion
        }
    }

    /// Struct values are only produced from the canonical opaque pointer.
    pub fn can_convert_from(&self, other: &Type) -> Conversion {
        match other {
            Type::VoidPtr => Conversion::Safe,
            _ => Conversion::NoConversion,
        }
    }
}

impl NativePointerType {
    /// Conversion target used by struct-reference rules: the pointee of
    /// another struct reference, or a struct value itself.
    fn struct_ref_target(other: &Type) -> Option<&Type> {
        match other {
            Type::NativePointer(ptr) if ptr.is_struct_ref() => Some(ptr.pointee()),
            Type::StructValue(_) => Some(other),
            _ => None,
        }
    }

    /// Struct references convert to other struct references and to struct
    /// values as the pointee does. Raw pointers carry no rule of their own.
    pub fn can_convert_to(&self, ctx: &dyn ConversionContext, other: &Type) -> Conversion {
        if !self.is_struct_ref() {
            return Conversion::NoConversion;
        }
        match Self::struct_ref_target(other) {
            Some(target) => {
                tracing::trace!(
                    pointee = %self.pointee(),
                    target = %target,
                    "struct ref conversion"
                );
                ctx.can_convert(self.pointee(), target)
            }
            None => Conversion::NoConversion,
        }
    }

    /// Mirror of [`can_convert_to`](Self::can_convert_to) for the incoming
    /// direction; both ask the context about the pointee first.
    pub fn can_convert_from(&self, ctx: &dyn ConversionContext, other: &Type) -> Conversion {
        if !self.is_struct_ref() {
            return Conversion::NoConversion;
        }
        let Some(target) = Self::struct_ref_target(other) else {
            return Conversion::NoConversion;
        };
        tracing::trace!(pointee = %self.pointee(), source = %target, "struct ref conversion");
        ctx.can_convert(self.pointee(), target)
    }
}

impl Type {
    /// Bridge rule for converting `self` into `other`.
    ///
    /// Non-native types have no rule here and answer
    /// [`Conversion::NoConversion`]; the host decides for them.
    pub fn can_convert_to(&self, ctx: &dyn ConversionContext, other: &Type) -> Conversion {
        match self {
            Type::StructValue(value) => value.can_convert_to(other),
            Type::NativePointer(ptr) => ptr.can_convert_to(ctx, other),
            _ => Conversion::NoConversion,
        }
    }

    /// Bridge rule for converting `other` into `self`.
    pub fn can_convert_from(&self, ctx: &dyn ConversionContext, other: &Type) -> Conversion {
        match self {
            Type::StructValue(value) => value.can_convert_from(other),
            Type::NativePointer(ptr) => ptr.can_convert_from(ctx, other),
            _ => Conversion::NoConversion,
        }
    }
}

/// Reference host conversion rules.
///
/// Covers identity, numeric widening/narrowing, pointer-to-`voidptr`
/// decay, and defers to the bridge rules for native types.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseConversions;

impl BaseConversions {
    pub fn new() -> Self {
        Self
    }

    fn numeric(from: &Type, to: &Type) -> Option<Conversion> {
        let verdict = match (from, to) {
            (
                Type::Int {
                    width: fw,
                    signedness: fs,
                },
                Type::Int {
                    width: tw,
                    signedness: ts,
                },
            ) => {
                if fs == ts && tw >= fw {
                    Conversion::Safe
                } else if *fs == Signedness::Unsigned && *ts == Signedness::Signed && tw > fw {
                    Conversion::Safe
                } else {
                    Conversion::Unsafe
                }
            }
            (Type::Bool, Type::Int { .. }) => Conversion::Safe,
            (Type::Int { .. }, Type::Float { .. }) => Conversion::Safe,
            (Type::Float { .. }, Type::Int { .. }) => Conversion::Unsafe,
            (Type::Float { precision: fp }, Type::Float { precision: tp })
            | (Type::Complex { precision: fp }, Type::Complex { precision: tp }) => {
                widen_float(*fp, *tp)
            }
            (Type::Float { precision: fp }, Type::Complex { precision: tp }) => {
                widen_float(*fp, *tp)
            }
            (Type::Int { .. }, Type::Complex { .. }) => Conversion::Safe,
            _ => return None,
        };
        Some(verdict)
    }
}

fn widen_float(from: FloatPrecision, to: FloatPrecision) -> Conversion {
    if to >= from {
        Conversion::Safe
    } else {
        Conversion::Unsafe
    }
}

impl ConversionContext for BaseConversions {
    fn can_convert(&self, from: &Type, to: &Type) -> Conversion {
        if from == to {
            return Conversion::Safe;
        }
        if from.is_native() || to.is_native() {
            let verdict = from
                .can_convert_to(self, to)
                .best(to.can_convert_from(self, from));
            if verdict.is_convertible() {
                return verdict;
            }
        }
        if *to == Type::VoidPtr && from.is_pointer() {
            return Conversion::Safe;
        }
        Self::numeric(from, to).unwrap_or(Conversion::NoConversion)
    }
}
