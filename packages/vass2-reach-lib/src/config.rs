use std::time::Duration;

use crate::{
    automaton::{lps::builder::SearchBounds, vass::initialized::InitializedVASS2},
    logger::LogLevel,
};

/// Declares a configuration struct together with a partial twin used for
/// deserialization, so that config files only need to mention the fields
/// they change.
///
/// Plain fields are listed as `name: Type = default`. Fields that are
/// configuration structs themselves go into a `nested` block and are merged
/// field by field.
macro_rules! config {
    (
        $vis:vis struct $name:ident {
            $( $field:ident : $ty:ty = $default:expr ),* $(,)?
        }
        $( nested {
            $( $nested:ident : $nested_ty:ident = $nested_default:expr ),* $(,)?
        } )?
    ) => {
        paste::paste! {
            #[derive(Debug, Clone, serde::Serialize)]
            $vis struct $name {
                $( $field: $ty, )*
                $($( $nested: $nested_ty, )*)?
            }

            #[derive(Debug, Clone, Default, serde::Deserialize)]
            $vis struct [<Partial $name>] {
                $( $field: Option<$ty>, )*
                $($( $nested: Option<[<Partial $nested_ty>]>, )*)?
            }

            impl $name {
                pub fn from_partial(partial: [<Partial $name>]) -> Self {
                    Self {
                        $( $field: partial.$field.unwrap_or($default), )*
                        $($(
                            $nested: partial
                                .$nested
                                .map($nested_ty::from_partial)
                                .unwrap_or($nested_default),
                        )*)?
                    }
                }

                pub fn from_toml(content: &str) -> anyhow::Result<Self> {
                    Ok(Self::from_partial(toml::from_str(content)?))
                }

                pub fn from_file<P: AsRef<std::path::Path>>(file_path: P) -> anyhow::Result<Self> {
                    use anyhow::Context;

                    let file_path = file_path.as_ref();
                    let content = std::fs::read_to_string(file_path)
                        .with_context(|| format!("failed to read config {}", file_path.display()))?;
                    Self::from_toml(&content)
                        .with_context(|| format!("invalid config {}", file_path.display()))
                }

                pub fn from_optional_file<P: AsRef<std::path::Path>>(
                    file_path: Option<P>,
                ) -> anyhow::Result<Self> {
                    match file_path {
                        Some(p) => Self::from_file(p),
                        None => Ok(Self::default()),
                    }
                }

                $(
                    pub fn [<with_ $field>](mut self, $field: $ty) -> Self {
                        self.$field = $field;
                        self
                    }

                    pub fn [<set_ $field>](&mut self, $field: $ty) {
                        self.$field = $field;
                    }

                    pub fn [<get_ $field>](&self) -> &$ty {
                        &self.$field
                    }
                )*

                $($(
                    pub fn [<with_ $nested>](mut self, $nested: $nested_ty) -> Self {
                        self.$nested = $nested;
                        self
                    }

                    pub fn [<get_ $nested>](&self) -> &$nested_ty {
                        &self.$nested
                    }
                )*)?
            }

            impl Default for $name {
                fn default() -> Self {
                    $name {
                        $( $field: $default, )*
                        $($( $nested: $nested_default, )*)?
                    }
                }
            }
        }
    };
}

config! {
    pub struct LoggerConfig {
        enabled: bool = false,
        log_file: bool = false,
        log_level: LogLevel = LogLevel::Warn,
    }
}

config! {
    pub struct CandidateConfig {
        window: i64 = 5,
        max_combinations: usize = 100_000,
    }
}

config! {
    pub struct VASS2ReachConfig {
        timeout: Option<Duration> = None,
        max_path_length: Option<usize> = None,
        max_cycles: Option<usize> = None,
        parallel: bool = false,
    }
    nested {
        candidates: CandidateConfig = CandidateConfig::default(),
        logger: LoggerConfig = LoggerConfig::default(),
    }
}

impl VASS2ReachConfig {
    /// The configured bounds, falling back to bounds derived from the
    /// automaton for the ones that are not set.
    pub fn search_bounds(&self, ivass: &InitializedVASS2) -> SearchBounds {
        let derived = SearchBounds::from_automaton(&ivass.vass);

        SearchBounds::new(
            self.max_path_length.unwrap_or(derived.max_path_length),
            self.max_cycles.unwrap_or(derived.max_cycles),
        )
    }
}
