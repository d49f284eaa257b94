use std::fmt;

/// Which side of a conversion pair a type occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
	Source,
	Destination,
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Source => write!(f, "source"),
			Self::Destination => write!(f, "destination"),
		}
	}
}

/// Registration failures.
///
/// These are configuration bugs in a registrar, never transient conditions,
/// so they are reported synchronously at the registration call site.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
	/// Source and destination are the same type.
	#[error("cannot register a converter from `{ty}` to itself")]
	SameType { ty: &'static str },

	/// A type failed the public/registrable check for its role.
	#[error("{role} type `{ty}` cannot take part in a conversion: {reason}")]
	NotRegistrable {
		ty: &'static str,
		role: Role,
		reason: &'static str,
	},

	/// An entry for the exact pair already exists.
	#[error(
		"duplicate converter `{source_ty}` -> `{destination}`: already served by `{existing}`{}",
		inherited_note(.inherited_from)
	)]
	Duplicate {
		source_ty: &'static str,
		destination: &'static str,
		existing: String,
		inherited_from: Option<&'static str>,
	},
}

fn inherited_note(from: &Option<&'static str>) -> String {
	from.map(|ty| format!(" (installed for `{ty}`)"))
		.unwrap_or_default()
}

/// Failures raised while applying a converter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
	/// The converter was handed a value of the wrong type.
	#[error("converter expected a `{expected}` value")]
	SourceMismatch { expected: &'static str },

	/// The converter produced a value of an unexpected type.
	#[error("converter did not produce a `{expected}` value")]
	TargetMismatch { expected: &'static str },

	/// No tier of the registry knows the pair.
	#[error("no conversion from `{from}` to `{to}`")]
	Unsupported { from: &'static str, to: &'static str },

	/// The value does not fit the destination type.
	#[error("{value} is out of range for `{to}`")]
	OutOfRange { value: String, to: &'static str },

	/// Text input could not be parsed into the destination type.
	#[error("cannot parse {input:?} as `{to}`: {reason}")]
	Parse {
		input: String,
		to: &'static str,
		reason: String,
	},

	/// A hierarchy cast refused the value.
	#[error("value cannot be viewed as `{through}`")]
	Projection { through: &'static str },

	#[error("{0}")]
	Custom(String),
}

/// Configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("invalid registry config: {0}")]
	Toml(#[from] toml::de::Error),
}
