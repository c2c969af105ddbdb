//! Prompt templates for the two utilities.

use scribe_vocabulary::TagSet;

/// Phrase every dek must open with.
pub const DEK_OPENING: &str = "In which the author";

/// Ask for 1-8 tags from the vocabulary, comma-separated.
pub fn tagging_prompt(body: &str, vocabulary: &TagSet) -> String {
    format!(
        "\nGiven the following content:\n\n{body}\n\n\
         And the following list of potential tags:\n{tags}\n\n\
         Suggest 1-8 applicable tags from the list. Return only the tags, separated by commas.",
        tags = vocabulary.joined(),
    )
}

/// Ask for a single Victorian chapter-heading style sentence.
pub fn summary_prompt(body: &str) -> String {
    format!(
        "\nGiven the following weekly note content:\n\n{body}\n\n\
         Generate a one-sentence summary in the style of Victorian-era chapter summaries, \
         starting with '{DEK_OPENING}', and capturing the essence of the week's activities. \
         Do not use the word \"delves\" or the phrase \"embarks on creative endeavors\". \
         Return only the summary, without quotation marks.\n"
    )
}
