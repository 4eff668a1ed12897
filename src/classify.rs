#[derive(serde::Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Theft,
    Assault,
    Fraud,
    Default,
}

/// Keyword sets in priority order. The first category with a keyword contained in the text wins.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Theft, &["theft", "stolen", "steal", "robbed"]),
    (Category::Assault, &["assault", "attack", "beaten", "fight"]),
    (Category::Fraud, &["fraud", "scam", "cheated", "money"]),
];

pub const DEMO_DISCLAIMER: &str = "\n\n*(Analysis provided by deterministic demo engine - Configure GOOGLE_API_KEY for live AI)*";

const DEFAULT_RECOMMENDATION: &str = "## Next Steps
- Check CCTV footage from nearby cameras
- Interview witness for detailed description
- Alert nearby patrol units
- Check similar cases in the database
- Coordinate with traffic control for vehicle tracking";

const THEFT_RECOMMENDATION: &str = "## Analysis
Vehicle theft requires immediate containment.

## Next Steps
- Check CCTV footage from nearby cameras
- Interview witness for vehicle/suspect description
- Alert nearby patrol units with description
- Check pawn shops and second-hand dealers
- Review similar recent theft cases";

const ASSAULT_RECOMMENDATION: &str = "## Analysis
Physical assault cases prioritize victim safety.

## Next Steps
- Secure medical attention for victim
- Document injuries and collect evidence
- Interview witnesses and collect statements
- Check CCTV for suspect identification";

const FRAUD_RECOMMENDATION: &str = "## Analysis
Financial fraud leaves digital trails.

## Next Steps
- Collect all financial transaction records
- Trace money flow through banking channels
- Check for similar fraud patterns in database
- Coordinate with cyber cell for digital evidence";

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Theft => "theft",
            Category::Assault => "assault",
            Category::Fraud => "fraud",
            Category::Default => "default",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn classify(text: &str) -> Category {
    let text = text.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map_or(Category::Default, |(category, _)| *category)
}

pub fn fallback_respond(category: Category) -> &'static str {
    match category {
        Category::Theft => THEFT_RECOMMENDATION,
        Category::Assault => ASSAULT_RECOMMENDATION,
        Category::Fraud => FRAUD_RECOMMENDATION,
        Category::Default => DEFAULT_RECOMMENDATION,
    }
}
