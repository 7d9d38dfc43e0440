//! Stopword lists
//!
//! `social` is the short list tuned for forum posts (it also drops filler
//! such as "tips", "thanks", "feel"); `english` is a general-purpose list
//! that extends it with common function words.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

const SOCIAL_WORDS: &str = "a an the and or of in to for with on at from by about into over after \
    before between out up down off above under again further then once here there all any both each \
    few more most other some such no nor not only own same so than too very can will just don dont \
    should shouldve now is are was were be been being have has had having do does did doing i me my \
    myself we our ours ourselves you your yours yourself yourselves he him his himself she her hers \
    herself it its itself they them their theirs themselves what which who whom this that these those \
    am isnt arent wasnt werent havent hasnt hadnt doesnt didnt wont wouldnt shant shouldnt mustnt cant \
    cannot could couldnt might mightnt neednt look also thinking tips feel feels like really help \
    please get got one two small big question thanks thank";

const ENGLISH_EXTRA: &str = "across afterwards against almost alone along already although always \
    among amongst amount another anyhow anyone anything anyway anywhere around back became because \
    become becomes becoming beforehand behind below beside besides beyond bill bottom call co con \
    de describe detail done due during eg eight either eleven else elsewhere empty enough etc even \
    ever every everyone everything everywhere except fifteen fifty fill find fire first five former \
    formerly forty found four front full give go hence hereafter hereby herein hereupon however \
    hundred ie inc indeed interest keep last latter latterly least less ltd made many may meanwhile \
    mine moreover mostly move much must name namely neither never nevertheless next nine nobody none \
    noone nothing nowhere often onto others otherwise part per perhaps put rather re see seem seemed \
    seeming seems serious several show side since sincere six sixty somehow someone something \
    sometime sometimes somewhere still system take ten thence thereafter thereby therefore therein \
    thereupon thick thin third three through throughout thru thus together top toward towards twelve \
    twenty un until upon us via well whatever when whence whenever where whereafter whereas whereby \
    wherein whereupon wherever whether while whither whoever whole whose why within without would \
    yet";

static SOCIAL: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| SOCIAL_WORDS.split_whitespace().collect());

static ENGLISH: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    SOCIAL_WORDS
        .split_whitespace()
        .chain(ENGLISH_EXTRA.split_whitespace())
        .collect()
});

/// Which stopword list the phrase extractor uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopwordList {
    /// No stopwords; only the ban list removes tokens
    None,
    /// Short list for forum and social posts
    Social,
    /// General English function words
    #[default]
    English,
}

impl StopwordList {
    /// Check whether a (lowercase) token is a stopword
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        match self {
            Self::None => false,
            Self::Social => SOCIAL.contains(token),
            Self::English => ENGLISH.contains(token),
        }
    }

    /// Number of words in the list
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Social => SOCIAL.len(),
            Self::English => ENGLISH.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
