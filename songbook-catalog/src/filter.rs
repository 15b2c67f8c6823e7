//! Filter compiler for the song list
//!
//! Turns query-string filters into a parameterized `WHERE` fragment plus the
//! values to bind, in placeholder order (`?1`, `?2`, ...).

use std::collections::HashMap;

/// Filter key -> raw value, as received from the client
pub type FilterSet = HashMap<String, String>;

/// Recognized filter keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SongFilter {
    /// Case-insensitive substring match on group name
    Group,
    /// Case-insensitive substring match on song title
    Song,
    MinReleaseDate,
    MaxReleaseDate,
    ReleaseDate,
    /// Case-insensitive substring match on link
    Link,
}

impl SongFilter {
    /// Map a query key to a filter; unknown keys yield `None`
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "group" => Some(Self::Group),
            "song" => Some(Self::Song),
            "min_release_date" => Some(Self::MinReleaseDate),
            "max_release_date" => Some(Self::MaxReleaseDate),
            "release_date" => Some(Self::ReleaseDate),
            "link" => Some(Self::Link),
            _ => None,
        }
    }

    /// SQL condition referencing placeholder `?{placeholder}`
    ///
    /// Substring filters match against the lowercased `*_folded` columns,
    /// since SQLite's LIKE only folds ASCII letters.
    fn condition(self, placeholder: usize) -> String {
        match self {
            Self::Group => format!("group_name_folded LIKE ?{}", placeholder),
            Self::Song => format!("song_name_folded LIKE ?{}", placeholder),
            Self::MinReleaseDate => format!("release_date >= ?{}", placeholder),
            Self::MaxReleaseDate => format!("release_date <= ?{}", placeholder),
            Self::ReleaseDate => format!("release_date = ?{}", placeholder),
            Self::Link => format!("link_folded LIKE ?{}", placeholder),
        }
    }

    /// Value bound to the condition's placeholder
    fn argument(self, value: &str) -> String {
        match self {
            Self::Group | Self::Song | Self::Link => format!("%{}%", fold_case(value)),
            Self::MinReleaseDate | Self::MaxReleaseDate | Self::ReleaseDate => value.to_string(),
        }
    }
}

/// Case folding applied to stored `*_folded` columns and to substring filter values
pub fn fold_case(value: &str) -> String {
    value.to_lowercase()
}

/// Compiled filters: ANDed conditions and their bound values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterClause {
    conditions: Vec<String>,
    args: Vec<String>,
}

impl FilterClause {
    /// `" WHERE a AND b"`, or an empty string when nothing was recognized
    pub fn where_sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// Values to bind, `args()[i]` belongs to placeholder `?{i + 1}`
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// First placeholder number free for parameters appended after the filter
    pub fn next_placeholder(&self) -> usize {
        self.args.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// Compile a filter set
///
/// Placeholders are numbered as conditions are emitted, so the clause stays
/// consistent whatever order the map yields its keys in.
pub fn compile_filters(filters: &FilterSet) -> FilterClause {
    let mut clause = FilterClause::default();

    for (key, value) in filters {
        let Some(filter) = SongFilter::from_key(key) else {
            continue;
        };
        let placeholder = clause.next_placeholder();
        clause.conditions.push(filter.condition(placeholder));
        clause.args.push(filter.argument(value));
    }

    clause
}
