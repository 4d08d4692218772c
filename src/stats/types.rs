use crate::storage::pipeline::QueryResult;

/// The fixed catalog of ranking statistics, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistic {
    TotalBooks,
    HighestRatedBook,
    MostReviewedBook,
    MostProlificAuthor,
    MostProlificNarrator,
    HighestAvgRatedAuthor,
    HighestAvgReviewedAuthor,
}

impl Statistic {
    pub const ALL: [Statistic; 7] = [
        Statistic::TotalBooks,
        Statistic::HighestRatedBook,
        Statistic::MostReviewedBook,
        Statistic::MostProlificAuthor,
        Statistic::MostProlificNarrator,
        Statistic::HighestAvgRatedAuthor,
        Statistic::HighestAvgReviewedAuthor,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Statistic::TotalBooks => "Total audiobooks in the store",
            Statistic::HighestRatedBook => "Highest rated audiobook",
            Statistic::MostReviewedBook => "Most reviewed audiobook",
            Statistic::MostProlificAuthor => "Author with the most audiobooks",
            Statistic::MostProlificNarrator => "Narrator with the most narrated audiobooks",
            Statistic::HighestAvgRatedAuthor => "Author with the highest average rating",
            Statistic::HighestAvgReviewedAuthor => {
                "Author with the highest average number of reviews per audiobook"
            }
        }
    }
}

/// One computed statistic, ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct StatRow {
    pub statistic: Statistic,
    /// First result of the pipeline, or `QueryResult::Empty` when nothing ranked.
    pub result: QueryResult,
}
