use regex::Regex;

/// Why a candidate was kept out of dispatch during pre-screening, and the
/// exact `err_message` text the synthesized `IGNORED` event carries (§4.5
/// step 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Include,
    Exclude,
}

impl IgnoreReason {
    pub fn message(self) -> &'static str {
        match self {
            IgnoreReason::Include => "search criteria not met: include",
            IgnoreReason::Exclude => "search criteria not met: exclude",
        }
    }
}

/// Compiled include/exclude lists applied to a candidate's `relpath/filename`
/// during the Ingester's pre-screen step.
///
/// An empty include list matches everything (the list is only consulted
/// "when that list is non-empty", per §4.5).
#[derive(Debug, Clone, Default)]
pub struct ScreenLists {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl ScreenLists {
    pub fn new(include: Vec<Regex>, exclude: Vec<Regex>) -> Self {
        Self { include, exclude }
    }

    pub fn compile(include: &[String], exclude: &[String]) -> Result<Self, regex::Error> {
        let include = include.iter().map(|p| Regex::new(p)).collect::<Result<_, _>>()?;
        let exclude = exclude.iter().map(|p| Regex::new(p)).collect::<Result<_, _>>()?;
        Ok(Self::new(include, exclude))
    }

    /// Classifies one candidate's storage-relative path. `None` means the
    /// candidate should proceed to dispatch.
    pub fn classify(&self, relpath_filename: &str) -> Option<IgnoreReason> {
        if !self.include.is_empty() && !self.include.iter().any(|re| re.is_match(relpath_filename)) {
            return Some(IgnoreReason::Include);
        }
        if self.exclude.iter().any(|re| re.is_match(relpath_filename)) {
            return Some(IgnoreReason::Exclude);
        }
        None
    }
}
