use clap::ValueEnum;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, ValueEnum)]
pub enum SortField {
	/// Dataset order: newest first.
	#[default]
	None,
	Name,
	Qfe,
	Version,
	Date,
	Critical,
}

impl std::fmt::Display for SortField {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			SortField::None => write!(f, "No Sort"),
			SortField::Name => write!(f, "Name"),
			SortField::Qfe => write!(f, "QFE ID"),
			SortField::Version => write!(f, "Version"),
			SortField::Date => write!(f, "Release Date"),
			SortField::Critical => write!(f, "Criticality"),
		}
	}
}
