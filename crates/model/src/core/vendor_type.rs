//! The closed set of SQL Server column types a destination table can be
//! declared with.
//!
//! Parameterized types carry their arguments as [`TypeArg`]s, which only
//! [`VendorType::construct`] (and the helpers and parser built on it) can
//! produce. An out-of-bound argument is rejected before any DDL is rendered.

use crate::core::error::TypeError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Inclusive bound on a single type argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// `lo <= value <= hi`
    Range(u32, u32),
    /// `value <= hi` (arguments are unsigned, so the lower side is implicit)
    AtMost(u32),
}

impl Bound {
    pub fn contains(&self, value: u32) -> bool {
        match *self {
            Bound::Range(lo, hi) => (lo..=hi).contains(&value),
            Bound::AtMost(hi) => value <= hi,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Range(lo, hi) => write!(f, "[{lo}, {hi}]"),
            Bound::AtMost(hi) => write!(f, "<= {hi}"),
        }
    }
}

const LENGTH_8000: Bound = Bound::Range(1, 8000);
const LENGTH_4000: Bound = Bound::Range(1, 4000);
const PRECISION: Bound = Bound::Range(1, 38);
const SCALE: Bound = Bound::Range(0, 38);
const FRACTIONAL_SECONDS: Bound = Bound::AtMost(7);
const MANTISSA: Bound = Bound::Range(1, 53);

/// A type argument that has been checked against its kind's bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeArg(u32);

impl TypeArg {
    /// Bound check usable in constants; an out-of-bound value fails the build.
    const fn checked(value: u32, bound: Bound) -> Self {
        let ok = match bound {
            Bound::Range(lo, hi) => value >= lo && value <= hi,
            Bound::AtMost(hi) => value <= hi,
        };
        assert!(ok, "type argument out of bounds");
        TypeArg(value)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TypeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a [`VendorType`] variant without its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    BigInt,
    Binary,
    Bit,
    Char,
    Date,
    DateTime,
    DateTime2,
    DateTimeOffset,
    Decimal,
    Float,
    Geography,
    Geometry,
    Image,
    Int,
    Money,
    NChar,
    NText,
    Numeric,
    NVarChar,
    NVarCharMax,
    Real,
    SmallDateTime,
    SmallInt,
    SmallMoney,
    Text,
    Time,
    TinyInt,
    UniqueIdentifier,
    VarBinary,
    VarBinaryMax,
    VarChar,
    VarCharMax,
    Xml,
}

impl TypeKind {
    /// All kinds in ordinal order. The position of a kind in this array is its
    /// persisted id and must never change.
    pub const ALL: [TypeKind; 33] = [
        TypeKind::BigInt,
        TypeKind::Binary,
        TypeKind::Bit,
        TypeKind::Char,
        TypeKind::Date,
        TypeKind::DateTime,
        TypeKind::DateTime2,
        TypeKind::DateTimeOffset,
        TypeKind::Decimal,
        TypeKind::Float,
        TypeKind::Geography,
        TypeKind::Geometry,
        TypeKind::Image,
        TypeKind::Int,
        TypeKind::Money,
        TypeKind::NChar,
        TypeKind::NText,
        TypeKind::Numeric,
        TypeKind::NVarChar,
        TypeKind::NVarCharMax,
        TypeKind::Real,
        TypeKind::SmallDateTime,
        TypeKind::SmallInt,
        TypeKind::SmallMoney,
        TypeKind::Text,
        TypeKind::Time,
        TypeKind::TinyInt,
        TypeKind::UniqueIdentifier,
        TypeKind::VarBinary,
        TypeKind::VarBinaryMax,
        TypeKind::VarChar,
        TypeKind::VarCharMax,
        TypeKind::Xml,
    ];

    /// Stable ordinal used for persistence and equality across processes.
    pub fn id(&self) -> u8 {
        // ALL is ordered by declaration, so the discriminant is the ordinal.
        *self as u8
    }

    pub fn from_id(id: u8) -> Option<TypeKind> {
        TypeKind::ALL.get(id as usize).copied()
    }

    /// The SQL keyword the type renders with.
    pub fn keyword(&self) -> &'static str {
        match self {
            TypeKind::BigInt => "BIGINT",
            TypeKind::Binary => "BINARY",
            TypeKind::Bit => "BIT",
            TypeKind::Char => "CHAR",
            TypeKind::Date => "DATE",
            TypeKind::DateTime => "DATETIME",
            TypeKind::DateTime2 => "DATETIME2",
            TypeKind::DateTimeOffset => "DATETIMEOFFSET",
            TypeKind::Decimal => "DECIMAL",
            TypeKind::Float => "FLOAT",
            TypeKind::Geography => "GEOGRAPHY",
            TypeKind::Geometry => "GEOMETRY",
            TypeKind::Image => "IMAGE",
            TypeKind::Int => "INT",
            TypeKind::Money => "MONEY",
            TypeKind::NChar => "NCHAR",
            TypeKind::NText => "NTEXT",
            TypeKind::Numeric => "NUMERIC",
            TypeKind::NVarChar | TypeKind::NVarCharMax => "NVARCHAR",
            TypeKind::Real => "REAL",
            TypeKind::SmallDateTime => "SMALLDATETIME",
            TypeKind::SmallInt => "SMALLINT",
            TypeKind::SmallMoney => "SMALLMONEY",
            TypeKind::Text => "TEXT",
            TypeKind::Time => "TIME",
            TypeKind::TinyInt => "TINYINT",
            TypeKind::UniqueIdentifier => "UNIQUEIDENTIFIER",
            TypeKind::VarBinary | TypeKind::VarBinaryMax => "VARBINARY",
            TypeKind::VarChar | TypeKind::VarCharMax => "VARCHAR",
            TypeKind::Xml => "XML",
        }
    }

    /// Declared bounds, one per argument. The slice length is the arity.
    pub fn bounds(&self) -> &'static [Bound] {
        match self {
            TypeKind::Binary | TypeKind::Char | TypeKind::VarBinary | TypeKind::VarChar => {
                &[LENGTH_8000]
            }
            TypeKind::NChar | TypeKind::NVarChar => &[LENGTH_4000],
            TypeKind::Decimal | TypeKind::Numeric => &[PRECISION, SCALE],
            TypeKind::DateTime2 | TypeKind::DateTimeOffset | TypeKind::Time => {
                &[FRACTIONAL_SECONDS]
            }
            TypeKind::Float => &[MANTISSA],
            _ => &[],
        }
    }

    pub fn arity(&self) -> usize {
        self.bounds().len()
    }

    fn is_max(&self) -> bool {
        matches!(
            self,
            TypeKind::NVarCharMax | TypeKind::VarBinaryMax | TypeKind::VarCharMax
        )
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_max() {
            write!(f, "{}(MAX)", self.keyword())
        } else {
            f.write_str(self.keyword())
        }
    }
}

/// A SQL Server column type together with its validated arguments.
///
/// Serialized as its canonical SQL text, so deserializing goes through the
/// same bound checks as [`VendorType::construct`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum VendorType {
    BigInt,
    Binary(TypeArg),
    Bit,
    Char(TypeArg),
    Date,
    DateTime,
    DateTime2(TypeArg),
    DateTimeOffset(TypeArg),
    Decimal(TypeArg, TypeArg),
    Float(TypeArg),
    Geography,
    Geometry,
    Image,
    Int,
    Money,
    NChar(TypeArg),
    NText,
    Numeric(TypeArg, TypeArg),
    NVarChar(TypeArg),
    NVarCharMax,
    Real,
    SmallDateTime,
    SmallInt,
    SmallMoney,
    Text,
    Time(TypeArg),
    TinyInt,
    UniqueIdentifier,
    VarBinary(TypeArg),
    VarBinaryMax,
    VarChar(TypeArg),
    VarCharMax,
    Xml,
}

impl VendorType {
    /// Builds a type of the given kind, checking every argument against the
    /// kind's declared bound.
    pub fn construct(kind: TypeKind, args: &[u32]) -> Result<Self, TypeError> {
        let bounds = kind.bounds();
        if args.len() != bounds.len() {
            return Err(TypeError::Arity {
                kind,
                expected: bounds.len(),
                actual: args.len(),
            });
        }

        for (index, (value, bound)) in args.iter().zip(bounds).enumerate() {
            if !bound.contains(*value) {
                return Err(TypeError::OutOfBounds {
                    kind,
                    index,
                    value: *value,
                    bound: *bound,
                });
            }
        }

        let arg = |i: usize| TypeArg(args[i]);
        let ty = match kind {
            TypeKind::BigInt => VendorType::BigInt,
            TypeKind::Binary => VendorType::Binary(arg(0)),
            TypeKind::Bit => VendorType::Bit,
            TypeKind::Char => VendorType::Char(arg(0)),
            TypeKind::Date => VendorType::Date,
            TypeKind::DateTime => VendorType::DateTime,
            TypeKind::DateTime2 => VendorType::DateTime2(arg(0)),
            TypeKind::DateTimeOffset => VendorType::DateTimeOffset(arg(0)),
            TypeKind::Decimal | TypeKind::Numeric => {
                let (precision, scale) = (args[0], args[1]);
                if scale > precision {
                    return Err(TypeError::ScaleExceedsPrecision {
                        kind,
                        precision,
                        scale,
                    });
                }
                if kind == TypeKind::Decimal {
                    VendorType::Decimal(arg(0), arg(1))
                } else {
                    VendorType::Numeric(arg(0), arg(1))
                }
            }
            TypeKind::Float => VendorType::Float(arg(0)),
            TypeKind::Geography => VendorType::Geography,
            TypeKind::Geometry => VendorType::Geometry,
            TypeKind::Image => VendorType::Image,
            TypeKind::Int => VendorType::Int,
            TypeKind::Money => VendorType::Money,
            TypeKind::NChar => VendorType::NChar(arg(0)),
            TypeKind::NText => VendorType::NText,
            TypeKind::NVarChar => VendorType::NVarChar(arg(0)),
            TypeKind::NVarCharMax => VendorType::NVarCharMax,
            TypeKind::Real => VendorType::Real,
            TypeKind::SmallDateTime => VendorType::SmallDateTime,
            TypeKind::SmallInt => VendorType::SmallInt,
            TypeKind::SmallMoney => VendorType::SmallMoney,
            TypeKind::Text => VendorType::Text,
            TypeKind::Time => VendorType::Time(arg(0)),
            TypeKind::TinyInt => VendorType::TinyInt,
            TypeKind::UniqueIdentifier => VendorType::UniqueIdentifier,
            TypeKind::VarBinary => VendorType::VarBinary(arg(0)),
            TypeKind::VarBinaryMax => VendorType::VarBinaryMax,
            TypeKind::VarChar => VendorType::VarChar(arg(0)),
            TypeKind::VarCharMax => VendorType::VarCharMax,
            TypeKind::Xml => VendorType::Xml,
        };

        Ok(ty)
    }

    /// `FLOAT(53)`, double precision.
    pub const FLOAT_DOUBLE: VendorType = VendorType::Float(TypeArg::checked(53, MANTISSA));
    /// `TIME(7)`
    pub const TIME_FULL: VendorType = VendorType::Time(TypeArg::checked(7, FRACTIONAL_SECONDS));
    /// `DATETIME2(7)`
    pub const DATETIME2_FULL: VendorType =
        VendorType::DateTime2(TypeArg::checked(7, FRACTIONAL_SECONDS));
    /// `DATETIMEOFFSET(7)`
    pub const DATETIMEOFFSET_FULL: VendorType =
        VendorType::DateTimeOffset(TypeArg::checked(7, FRACTIONAL_SECONDS));

    pub fn binary(length: u32) -> Result<Self, TypeError> {
        Self::construct(TypeKind::Binary, &[length])
    }

    pub fn char(length: u32) -> Result<Self, TypeError> {
        Self::construct(TypeKind::Char, &[length])
    }

    pub fn nchar(length: u32) -> Result<Self, TypeError> {
        Self::construct(TypeKind::NChar, &[length])
    }

    pub fn varchar(length: u32) -> Result<Self, TypeError> {
        Self::construct(TypeKind::VarChar, &[length])
    }

    pub fn nvarchar(length: u32) -> Result<Self, TypeError> {
        Self::construct(TypeKind::NVarChar, &[length])
    }

    pub fn varbinary(length: u32) -> Result<Self, TypeError> {
        Self::construct(TypeKind::VarBinary, &[length])
    }

    pub fn decimal(precision: u32, scale: u32) -> Result<Self, TypeError> {
        Self::construct(TypeKind::Decimal, &[precision, scale])
    }

    pub fn numeric(precision: u32, scale: u32) -> Result<Self, TypeError> {
        Self::construct(TypeKind::Numeric, &[precision, scale])
    }

    pub fn float(mantissa: u32) -> Result<Self, TypeError> {
        Self::construct(TypeKind::Float, &[mantissa])
    }

    pub fn datetime2(fractional: u32) -> Result<Self, TypeError> {
        Self::construct(TypeKind::DateTime2, &[fractional])
    }

    pub fn datetimeoffset(fractional: u32) -> Result<Self, TypeError> {
        Self::construct(TypeKind::DateTimeOffset, &[fractional])
    }

    pub fn time(fractional: u32) -> Result<Self, TypeError> {
        Self::construct(TypeKind::Time, &[fractional])
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            VendorType::BigInt => TypeKind::BigInt,
            VendorType::Binary(_) => TypeKind::Binary,
            VendorType::Bit => TypeKind::Bit,
            VendorType::Char(_) => TypeKind::Char,
            VendorType::Date => TypeKind::Date,
            VendorType::DateTime => TypeKind::DateTime,
            VendorType::DateTime2(_) => TypeKind::DateTime2,
            VendorType::DateTimeOffset(_) => TypeKind::DateTimeOffset,
            VendorType::Decimal(_, _) => TypeKind::Decimal,
            VendorType::Float(_) => TypeKind::Float,
            VendorType::Geography => TypeKind::Geography,
            VendorType::Geometry => TypeKind::Geometry,
            VendorType::Image => TypeKind::Image,
            VendorType::Int => TypeKind::Int,
            VendorType::Money => TypeKind::Money,
            VendorType::NChar(_) => TypeKind::NChar,
            VendorType::NText => TypeKind::NText,
            VendorType::Numeric(_, _) => TypeKind::Numeric,
            VendorType::NVarChar(_) => TypeKind::NVarChar,
            VendorType::NVarCharMax => TypeKind::NVarCharMax,
            VendorType::Real => TypeKind::Real,
            VendorType::SmallDateTime => TypeKind::SmallDateTime,
            VendorType::SmallInt => TypeKind::SmallInt,
            VendorType::SmallMoney => TypeKind::SmallMoney,
            VendorType::Text => TypeKind::Text,
            VendorType::Time(_) => TypeKind::Time,
            VendorType::TinyInt => TypeKind::TinyInt,
            VendorType::UniqueIdentifier => TypeKind::UniqueIdentifier,
            VendorType::VarBinary(_) => TypeKind::VarBinary,
            VendorType::VarBinaryMax => TypeKind::VarBinaryMax,
            VendorType::VarChar(_) => TypeKind::VarChar,
            VendorType::VarCharMax => TypeKind::VarCharMax,
            VendorType::Xml => TypeKind::Xml,
        }
    }

    pub fn id(&self) -> u8 {
        self.kind().id()
    }

    pub fn args(&self) -> Vec<u32> {
        match *self {
            VendorType::Binary(n)
            | VendorType::Char(n)
            | VendorType::DateTime2(n)
            | VendorType::DateTimeOffset(n)
            | VendorType::Float(n)
            | VendorType::NChar(n)
            | VendorType::NVarChar(n)
            | VendorType::Time(n)
            | VendorType::VarBinary(n)
            | VendorType::VarChar(n) => vec![n.get()],
            VendorType::Decimal(p, s) | VendorType::Numeric(p, s) => vec![p.get(), s.get()],
            _ => vec![],
        }
    }

    /// Canonical SQL text, e.g. `NVARCHAR(255)` or `DECIMAL(18, 4)`.
    pub fn render(&self) -> String {
        let kind = self.kind();
        let args = self.args();
        if args.is_empty() {
            return kind.to_string();
        }

        let args = args
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({args})", kind.keyword())
    }
}

impl fmt::Display for VendorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl FromStr for VendorType {
    type Err = TypeError;

    /// Parses the canonical rendering back into a type. Keywords are matched
    /// case-insensitively and whitespace around arguments is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (keyword, args) = match trimmed.find('(') {
            Some(open) => {
                let close = trimmed
                    .rfind(')')
                    .filter(|close| *close == trimmed.len() - 1 && *close > open)
                    .ok_or_else(|| TypeError::Unknown(s.to_string()))?;
                (&trimmed[..open], Some(&trimmed[open + 1..close]))
            }
            None => (trimmed, None),
        };
        let keyword = keyword.trim().to_ascii_uppercase();

        match args {
            Some(args) if args.trim().eq_ignore_ascii_case("MAX") => TypeKind::ALL
                .iter()
                .find(|k| k.is_max() && k.keyword() == keyword)
                .map(|k| VendorType::construct(*k, &[]))
                .unwrap_or_else(|| Err(TypeError::Unknown(s.to_string()))),
            Some(args) => {
                let values = args
                    .split(',')
                    .map(|a| a.trim().parse::<u32>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| TypeError::Unknown(s.to_string()))?;
                let kind = TypeKind::ALL
                    .iter()
                    .find(|k| !k.is_max() && k.arity() > 0 && k.keyword() == keyword)
                    .ok_or_else(|| TypeError::Unknown(s.to_string()))?;
                VendorType::construct(*kind, &values)
            }
            None => {
                let kind = TypeKind::ALL
                    .iter()
                    .find(|k| !k.is_max() && k.keyword() == keyword)
                    .ok_or_else(|| TypeError::Unknown(s.to_string()))?;
                VendorType::construct(*kind, &[])
            }
        }
    }
}

impl TryFrom<String> for VendorType {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VendorType> for String {
    fn from(value: VendorType) -> Self {
        value.render()
    }
}
