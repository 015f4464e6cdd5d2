use twilight_model::id::{Id, marker::UserMarker};

use crate::arguments::{ArgumentConverter, Error, ToOption};
use crate::options::{OptionDescriptor, OptionValue, SemanticType};

impl ArgumentConverter for String {
    fn convert(data: &OptionValue) -> Result<Self, Error> {
        if let OptionValue::String(value) = data {
            Ok(value.clone())
        } else {
            Err(Error::InvalidType)
        }
    }
}

impl ToOption for String {
    fn to_option() -> OptionDescriptor {
        OptionDescriptor::new(SemanticType::String)
    }
}

// --- Numeric Types ---
macro_rules! numeric_converter {
    ($ty:ty, $variant:expr) => {
        impl ArgumentConverter for $ty {
            fn convert(data: &OptionValue) -> Result<Self, Error> {
                match data {
                    OptionValue::Integer(value) => Ok(*value as $ty),
                    OptionValue::Long(value) => Ok(*value as $ty),
                    OptionValue::Double(value) => Ok(*value as $ty),
                    _ => Err(Error::InvalidType),
                }
            }
        }

        impl ToOption for $ty {
            fn to_option() -> OptionDescriptor {
                OptionDescriptor::new($variant)
            }
        }
    };
}

numeric_converter!(i32, SemanticType::Integer);
numeric_converter!(i64, SemanticType::Long);
numeric_converter!(f64, SemanticType::Double);

// --- Boolean Type ---
impl ArgumentConverter for bool {
    fn convert(data: &OptionValue) -> Result<Self, Error> {
        if let OptionValue::Boolean(v) = data {
            Ok(*v)
        } else {
            Err(Error::InvalidType)
        }
    }
}

impl ToOption for bool {
    fn to_option() -> OptionDescriptor {
        OptionDescriptor::new(SemanticType::Boolean)
    }
}

// --- User ID Type ---
impl ArgumentConverter for Id<UserMarker> {
    fn convert(data: &OptionValue) -> Result<Self, Error> {
        if let OptionValue::User(user) = data {
            Ok(*user)
        } else {
            Err(Error::InvalidType)
        }
    }
}

impl ToOption for Id<UserMarker> {
    fn to_option() -> OptionDescriptor {
        OptionDescriptor::new(SemanticType::User)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_convert_across_widths() {
        assert_eq!(i64::convert(&OptionValue::Integer(3)), Ok(3));
        assert_eq!(i32::convert(&OptionValue::Long(5)), Ok(5));
        assert_eq!(f64::convert(&OptionValue::Long(2)), Ok(2.0));
        assert_eq!(i64::convert(&OptionValue::Boolean(true)), Err(Error::InvalidType));
    }

    #[test]
    fn type_hints_map_to_semantic_types() {
        assert_eq!(String::to_option().kind, SemanticType::String);
        assert_eq!(i32::to_option().kind, SemanticType::Integer);
        assert_eq!(Id::<UserMarker>::to_option().kind, SemanticType::User);
        assert!(!Option::<bool>::to_option().required);
    }
}
