use serde::{Deserialize, Serialize};

/// A rating code string that is not one of the known categories.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid enum value for {field}: {value}")]
pub struct InvalidCode {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidCode;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidCode {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(Rating {
    Excellent => "E",
    Good => "G",
    Ok => "O",
    Poor => "P",
    Terrible => "T",
});

str_enum!(ChartKind {
    Pie => "pie",
    Bar => "bar",
});

impl Rating {
    /// All categories in chart order.
    pub const ALL: [Rating; 5] = [
        Rating::Excellent,
        Rating::Good,
        Rating::Ok,
        Rating::Poor,
        Rating::Terrible,
    ];

    /// Chart label for the category.
    pub fn label(&self) -> &'static str {
        match self {
            Rating::Excellent => "EXCELLENT",
            Rating::Good => "GOOD",
            Rating::Ok => "OK",
            Rating::Poor => "POOR",
            Rating::Terrible => "TERRIBLE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_roundtrips_codes() {
        for rating in Rating::ALL {
            assert_eq!(rating.as_str().parse::<Rating>().unwrap(), rating);
        }
    }

    #[test]
    fn rating_rejects_unknown_code() {
        let err = "X".parse::<Rating>().unwrap_err();
        assert_eq!(err.field, "Rating");
        assert_eq!(err.value, "X");
    }

    #[test]
    fn rating_codes_are_case_sensitive() {
        assert!("e".parse::<Rating>().is_err());
    }

    #[test]
    fn rating_serializes_as_code() {
        assert_eq!(serde_json::to_string(&Rating::Good).unwrap(), "\"G\"");
    }

    #[test]
    fn chart_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ChartKind::Pie).unwrap(), "\"pie\"");
        assert_eq!(ChartKind::Bar.to_string(), "bar");
    }

    #[test]
    fn labels_follow_chart_order() {
        let labels: Vec<_> = Rating::ALL.iter().map(Rating::label).collect();
        assert_eq!(labels, ["EXCELLENT", "GOOD", "OK", "POOR", "TERRIBLE"]);
    }
}
