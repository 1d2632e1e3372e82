use serde::{Deserialize, Serialize};

/// A movie in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    /// Row/column of this movie in the similarity matrix
    pub index: usize,
    /// Display title, also the lookup key for recommendations
    pub title: String,
    /// Identifier carried over from the source dataset, if any
    pub movie_id: Option<i64>,
}

/// Ordered movie catalog
///
/// Position `i` in the catalog corresponds to row `i` of the similarity matrix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    movies: Vec<Movie>,
}

impl Catalog {
    /// Builds a catalog from `(title, movie_id)` pairs, assigning positions in order
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Option<i64>)>,
    {
        let movies = entries
            .into_iter()
            .enumerate()
            .map(|(index, (title, movie_id))| Movie {
                index,
                title,
                movie_id,
            })
            .collect();

        Self { movies }
    }

    /// Builds a catalog from bare titles
    pub fn from_titles<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(titles.into_iter().map(|t| (t.into(), None)))
    }

    /// Position of the first movie with exactly this title
    pub fn position(&self, title: &str) -> Option<usize> {
        self.movies.iter().position(|m| m.title == title)
    }

    pub fn get(&self, index: usize) -> Option<&Movie> {
        self.movies.get(index)
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.movies.iter().map(|m| m.title.as_str())
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}
