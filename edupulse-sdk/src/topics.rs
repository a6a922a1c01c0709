//! Keyword-based topic detection
//!
//! Teachers describe problems in free text. A small keyword table maps
//! that text to the topic slugs the backend understands.

/// Keyword to topic slug, in priority order
pub const TOPIC_KEYWORDS: &[(&str, &str)] = &[
    ("subtract", "subtraction-borrowing"),
    ("borrow", "subtraction-borrowing"),
    ("zero", "subtraction-borrowing"),
    ("tens place", "subtraction-borrowing"),
    ("fraction", "fractions-conceptual"),
    ("half", "fractions-conceptual"),
    ("quarter", "fractions-conceptual"),
    ("multiply", "multiplication-tables"),
    ("times table", "multiplication-tables"),
    ("multiplication", "multiplication-tables"),
    ("noisy", "classroom-management"),
    ("discipline", "classroom-management"),
    ("attention", "classroom-management"),
    ("management", "classroom-management"),
    ("parent", "parent-engagement"),
    ("home", "parent-engagement"),
    ("family", "parent-engagement"),
    ("read", "reading-fluency"),
    ("reading", "reading-fluency"),
    ("fluency", "reading-fluency"),
    ("absent", "absenteeism"),
    ("attendance", "absenteeism"),
    ("missing", "absenteeism"),
    ("assess", "assessment-formative"),
    ("test", "assessment-formative"),
    ("check understanding", "assessment-formative"),
    ("different level", "differentiation"),
    ("mixed ability", "differentiation"),
    ("slow learner", "differentiation"),
];

/// Human-readable names for known topics
pub const TOPIC_DISPLAY_NAMES: &[(&str, &str)] = &[
    ("subtraction-borrowing", "Subtraction with Borrowing"),
    ("fractions-conceptual", "Understanding Fractions"),
    ("multiplication-tables", "Multiplication Tables"),
    ("classroom-management", "Classroom Management"),
    ("parent-engagement", "Parent Engagement"),
    ("reading-fluency", "Reading Fluency"),
    ("absenteeism", "Student Attendance"),
    ("assessment-formative", "Formative Assessment"),
    ("differentiation", "Differentiated Instruction"),
];

/// Topic used when nothing matches
pub const GENERAL_TOPIC: &str = "general";

const MAX_DETECTED: usize = 3;

/// Up to three distinct topics mentioned in `text`, in table order
pub fn detect_topics(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    let mut matches: Vec<&'static str> = Vec::new();

    for (keyword, topic) in TOPIC_KEYWORDS {
        if matches.len() == MAX_DETECTED {
            break;
        }
        if lower.contains(keyword) && !matches.contains(topic) {
            matches.push(topic);
        }
    }

    matches
}

/// The best topic for `text`, or [`GENERAL_TOPIC`]
pub fn primary_topic(text: &str) -> &'static str {
    detect_topics(text).first().copied().unwrap_or(GENERAL_TOPIC)
}

/// Display name for a topic slug
///
/// Unknown slugs have their first hyphen replaced by a space and every
/// word capitalized.
pub fn topic_display_name(topic: &str) -> String {
    if let Some((_, name)) = TOPIC_DISPLAY_NAMES.iter().find(|(slug, _)| *slug == topic) {
        return name.to_string();
    }

    title_case(&topic.replacen('-', " ", 1))
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;

    for c in text.chars() {
        let is_word = c.is_alphanumeric() || c == '_';
        if is_word && at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !is_word;
    }

    out
}
