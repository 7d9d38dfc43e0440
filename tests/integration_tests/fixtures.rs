//! Test fixtures for integration tests
//!
//! Filter, term and document table files in the formats the CLI reads

/// Filters file in JSON form
pub const FILTERS_JSON: &str = r#"{
    "synonyms": {
        "air fryer recipes": ["airfryer recipes", "air-fryer recipes"]
    },
    "banlist": ["promo code", "giveaway"],
    "ban_regex": ["\\bsponsored\\b"],
    "ban_entities": ["acme corp"],
    "allowlist": {
        "home": ["lights", "recipes"]
    }
}"#;

/// Same filters in TOML form
pub const FILTERS_TOML: &str = r#"
banlist = ["promo code", "giveaway"]
ban_regex = ['\bsponsored\b']
ban_entities = ["acme corp"]

[synonyms]
"air fryer recipes" = ["airfryer recipes", "air-fryer recipes"]

[allowlist]
home = ["lights", "recipes"]
"#;

/// Closed vocabulary for the trend corpus
pub const TERMS_JSON: &str = r#"{"terms": ["Air Fryer Recipes", "holiday lights", "air fryer recipes"]}"#;

/// Plain-text term list
pub const TERMS_TXT: &str = "air fryer recipes\n\n  holiday lights  \n";

/// Two good rows and two rows without a usable timestamp
pub const MALFORMED_CSV: &str = "\
source,subreddit,created_utc,title,text,url
reddit,cooking,1704110400,Crispy tofu bowls,weeknight crispy tofu,https://example.com/1
reddit,cooking,not-a-date,Crispy tofu bowls,again,https://example.com/2
rss,,2024-01-03T10:00:00Z,Crispy tofu bowls,,
youtube,cooking,,Crispy tofu bowls,no timestamp,https://example.com/4
";

/// Document table in JSON lines form
pub const DOCUMENTS_JSONL: &str = r#"{"source": "gnews", "query": "lighting", "date": "2024-01-08T09:00:00Z", "title": "Holiday lights", "summary": "Holiday lights sale"}
{"source": "rss", "domain": "example.com", "timestamp": 1704790800, "title": "Holiday lights return", "body": "", "url": "https://example.com/lights"}
"#;
