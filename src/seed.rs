// src/seed.rs

//! Embedded 30-question bank and startup seeding.
//!
//! The bank is the source of truth for the two-topic quiz: 15 questions on
//! data modeling fundamentals, 15 on normalization. It is inserted once
//! into an empty `quiz` table and never modified afterwards.

use sqlx::SqlitePool;

use crate::{
    config::{TOPIC_FUNDAMENTALS, TOPIC_NORMALIZATION},
    engine,
    error::AppError,
    models::question::Question,
};

struct SeedQuestion {
    topic: &'static str,
    question: &'static str,
    options: [&'static str; 4],
    /// Index of the correct option; stored as the option text.
    correct: usize,
    explanation: &'static str,
}

const BANK: &[SeedQuestion] = &[
    // --- Data Modeling & DBMS Fundamentals (15) ---
    SeedQuestion {
        topic: TOPIC_FUNDAMENTALS,
        question: "Which statement best describes a primary key?",
        options: [
            "Uniquely identifies each row and cannot be NULL",
            "Allows duplicate values and NULLs",
            "Identifies groups of rows but not a single row",
            "Is only used in views",
        ],
        correct: 0,
        explanation: "Primary keys must uniquely identify rows and be NOT NULL.",
    },
    SeedQuestion {
        topic: TOPIC_FUNDAMENTALS,
        question: "What is a candidate key?",
        options: [
            "Any attribute that stores numeric values",
            "Any superkey with redundant attributes removed",
            "A key chosen for indexing only",
            "The foreign key of a table",
        ],
        correct: 1,
        explanation: "A candidate key is a minimal superkey (no redundant attributes).",
    },
    SeedQuestion {
        topic: TOPIC_FUNDAMENTALS,
        question: "What is a superkey?",
        options: [
            "A set of attributes that uniquely identifies rows",
            "An attribute with many NULLs",
            "A key used only across tables",
            "A non-unique composite index",
        ],
        correct: 0,
        explanation: "Any attribute set that uniquely identifies a tuple is a superkey.",
    },
    SeedQuestion {
        topic: TOPIC_FUNDAMENTALS,
        question: "What does a foreign key enforce?",
        options: [
            "Table partitioning",
            "Functional dependency",
            "Referential integrity between tables",
            "Transaction isolation",
        ],
        correct: 2,
        explanation: "Foreign keys enforce referential integrity with the referenced table.",
    },
    SeedQuestion {
        topic: TOPIC_FUNDAMENTALS,
        question: "Which example is ONE-to-MANY?",
        options: [
            "Each order has exactly one customer; a customer has many orders",
            "Each order has many customers",
            "A product belongs to many categories and each category has many products",
            "Each order has one product and each product has one order",
        ],
        correct: 0,
        explanation: "One customer -> many orders is 1:M.",
    },
    SeedQuestion {
        topic: TOPIC_FUNDAMENTALS,
        question: "What is a composite key?",
        options: [
            "A key automatically generated by the DBMS",
            "A key composed of more than one attribute",
            "Any unique index",
            "A key that changes frequently",
        ],
        correct: 1,
        explanation: "Composite keys contain two or more attributes.",
    },
    SeedQuestion {
        topic: TOPIC_FUNDAMENTALS,
        question: "What is a surrogate key?",
        options: [
            "A business-meaningful key",
            "A randomly generated or sequence-based key without business meaning",
            "A natural key used in reports",
            "A foreign key with default value",
        ],
        correct: 1,
        explanation: "Surrogate keys are system-generated and free of business meaning.",
    },
    SeedQuestion {
        topic: TOPIC_FUNDAMENTALS,
        question: "In ER modeling, what is cardinality?",
        options: [
            "The number of attributes in an entity",
            "The number of rows in a table",
            "The count of entity instances that can participate in a relationship",
            "The number of foreign keys in a schema",
        ],
        correct: 2,
        explanation: "Cardinality describes participation counts in relationships.",
    },
    SeedQuestion {
        topic: TOPIC_FUNDAMENTALS,
        question: "A weak entity typically requires what?",
        options: [
            "A multivalued attribute",
            "An identifying relationship and a partial key",
            "Only a surrogate key",
            "No relationship to any other entity",
        ],
        correct: 1,
        explanation: "Weak entities depend on owners via an identifying relationship.",
    },
    SeedQuestion {
        topic: TOPIC_FUNDAMENTALS,
        question: "Schema vs. instance - which is true?",
        options: [
            "A schema changes every transaction",
            "An instance is the INTENT; a schema is the CONTENT",
            "A schema is the structure; an instance is the current data",
            "A schema is per row; instance is per column",
        ],
        correct: 2,
        explanation: "Schema = structure; instance = data at a point in time.",
    },
    SeedQuestion {
        topic: TOPIC_FUNDAMENTALS,
        question: "Which constraint type prevents duplicate non-NULL values?",
        options: ["CHECK", "DEFAULT", "UNIQUE", "FOREIGN KEY"],
        correct: 2,
        explanation: "UNIQUE prevents duplicate non-NULL values.",
    },
    SeedQuestion {
        topic: TOPIC_FUNDAMENTALS,
        question: "How should a multivalued attribute be mapped to relations?",
        options: [
            "Store as comma-separated values in one column",
            "Create a separate relation to hold the values",
            "Duplicate columns up to a fixed max",
            "Merge into the parent key column",
        ],
        correct: 1,
        explanation: "Multivalued attributes are mapped to a separate relation.",
    },
    SeedQuestion {
        topic: TOPIC_FUNDAMENTALS,
        question: "Which best describes a tuple?",
        options: [
            "A row in a relation",
            "A column in a relation",
            "A relationship between two tables",
            "A file in the database",
        ],
        correct: 0,
        explanation: "Tuple is the relational model term for row.",
    },
    SeedQuestion {
        topic: TOPIC_FUNDAMENTALS,
        question: "What is the main purpose of indexing?",
        options: [
            "Guarantee logical data independence",
            "Speed up data retrieval at the cost of extra writes",
            "Ensure BCNF",
            "Prevent deadlocks",
        ],
        correct: 1,
        explanation: "Indexes accelerate reads with write/storage overhead.",
    },
    SeedQuestion {
        topic: TOPIC_FUNDAMENTALS,
        question: "Which is true of normalization at a high level?",
        options: [
            "Ensures security roles",
            "Eliminates concurrency issues",
            "Reduces redundancy and anomalies",
            "Forces star schemas",
        ],
        correct: 2,
        explanation: "Normalization reduces redundancy and anomalies by structuring data.",
    },
    // --- Normalization & Dependencies (15) ---
    SeedQuestion {
        topic: TOPIC_NORMALIZATION,
        question: "Which best defines a functional dependency?",
        options: [
            "Two tables joined on a key",
            "One attribute (or set) uniquely determines another",
            "Two rows referencing the same foreign key",
            "Two attributes always having the same domain",
        ],
        correct: 1,
        explanation: "FD: X->Y means X determines Y.",
    },
    SeedQuestion {
        topic: TOPIC_NORMALIZATION,
        question: "Which violates FD theory?",
        options: [
            "Two rows share key but differ in non-key",
            "Two rows differ only in key",
            "Two rows have same non-key and same key",
            "Rows are in different tables",
        ],
        correct: 0,
        explanation: "If key matches, all dependent attributes must match.",
    },
    SeedQuestion {
        topic: TOPIC_NORMALIZATION,
        question: "What does 1NF require?",
        options: [
            "No NULLs",
            "Only numeric values",
            "Atomic (indivisible) attribute values",
            "All attributes must be keys",
        ],
        correct: 2,
        explanation: "1NF requires atomic values (no repeating groups).",
    },
    SeedQuestion {
        topic: TOPIC_NORMALIZATION,
        question: "Partial dependency is when a non-key attribute depends on...",
        options: [
            "The whole key only",
            "A non-key attribute",
            "Part of a composite key",
            "Any superkey",
        ],
        correct: 2,
        explanation: "2NF removes partial dependencies on part of a composite key.",
    },
    SeedQuestion {
        topic: TOPIC_NORMALIZATION,
        question: "2NF removes which anomaly source?",
        options: [
            "Transitive dependency",
            "Partial dependency",
            "Multivalued dependency",
            "Key substitution",
        ],
        correct: 1,
        explanation: "2NF addresses partial dependencies.",
    },
    SeedQuestion {
        topic: TOPIC_NORMALIZATION,
        question: "Transitive dependency means...",
        options: [
            "A->B and B->C implies A->C where C is non-prime",
            "All attributes determine the key",
            "Every FD has a superkey LHS",
            "No determinants exist",
        ],
        correct: 0,
        explanation: "3NF eliminates transitive dependencies on keys.",
    },
    SeedQuestion {
        topic: TOPIC_NORMALIZATION,
        question: "Which is allowed in 3NF?",
        options: ["NonKey->Key", "Key->NonKey", "NonKey->NonKey", "PartKey->NonKey"],
        correct: 1,
        explanation: "3NF allows dependencies from keys to non-keys; forbids transitive from non-keys.",
    },
    SeedQuestion {
        topic: TOPIC_NORMALIZATION,
        question: "BCNF requires...",
        options: [
            "Every FD has a superkey on the left",
            "Every FD has a candidate key on the right",
            "No NULLs allowed",
            "Only surrogate keys",
        ],
        correct: 0,
        explanation: "BCNF: for every X->Y, X must be a superkey.",
    },
    SeedQuestion {
        topic: TOPIC_NORMALIZATION,
        question: "Main goal of normalization is to reduce...",
        options: [
            "Joins in queries",
            "Storage size only",
            "Redundancy and anomalies",
            "Number of tables",
        ],
        correct: 2,
        explanation: "Normalization reduces redundancy/anomalies, not just table count.",
    },
    SeedQuestion {
        topic: TOPIC_NORMALIZATION,
        question: "Which property defines a lossless-join decomposition?",
        options: [
            "Every projection is BCNF",
            "Joining the decomposed tables never loses tuples",
            "All FDs are preserved automatically",
            "No NULLs in results",
        ],
        correct: 1,
        explanation: "Lossless join means no information loss after join.",
    },
    SeedQuestion {
        topic: TOPIC_NORMALIZATION,
        question: "What is dependency preservation?",
        options: [
            "All original FDs can be enforced without joining tables",
            "All FDs are eliminated",
            "All joins are avoided",
            "All keys become surrogate keys",
        ],
        correct: 0,
        explanation: "Dependency preservation avoids enforcing FDs across joins.",
    },
    SeedQuestion {
        topic: TOPIC_NORMALIZATION,
        question: "Closure of an attribute set X (X+) is...",
        options: [
            "Set of attributes functionally determined by X",
            "Minimal cover of FDs",
            "The set of keys in the schema",
            "The set of non-prime attributes",
        ],
        correct: 0,
        explanation: "Closure lists all attributes determined by X.",
    },
    SeedQuestion {
        topic: TOPIC_NORMALIZATION,
        question: "To fix a 2NF issue you should...",
        options: [
            "Create more indexes",
            "Denormalize the table",
            "Decompose to remove partial dependencies",
            "Drop foreign keys",
        ],
        correct: 2,
        explanation: "Decompose to eliminate partial dependencies (reach 2NF).",
    },
    SeedQuestion {
        topic: TOPIC_NORMALIZATION,
        question: "Given FD A,B->C and key (A,B), which is true?",
        options: [
            "C partially depends on the key",
            "C transitively depends on the key",
            "C is unrelated to the key",
            "C violates BCNF",
        ],
        correct: 0,
        explanation: "Non-key C depends on the whole composite key; not partial on a subset.",
    },
    SeedQuestion {
        topic: TOPIC_NORMALIZATION,
        question: "When decomposing for BCNF, what's the usual trade-off?",
        options: [
            "You may lose dependency preservation",
            "You always lose lossless join",
            "You must denormalize other tables",
            "You must remove all keys",
        ],
        correct: 0,
        explanation: "BCNF may sacrifice dependency preservation while keeping lossless join when possible.",
    },
];

/// Inserts the embedded bank if the `quiz` table is empty.
/// An already-seeded database is left untouched.
pub async fn seed_question_bank(pool: &SqlitePool) -> Result<(), AppError> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quiz")
        .fetch_one(pool)
        .await?;

    if existing > 0 {
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for q in BANK {
        let options_json = serde_json::to_string(&q.options)?;
        sqlx::query(
            r#"
            INSERT INTO quiz (question, two_category, options_json, correct_text, explanation)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(q.question)
        .bind(q.topic)
        .bind(options_json)
        .bind(q.options[q.correct])
        .bind(q.explanation)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    tracing::info!("Seeded {} quiz questions", BANK.len());
    Ok(())
}

/// Startup integrity check: loads the bank and verifies the 15+15 shape.
/// A malformed bank is fatal; the server must not serve quizzes from it.
pub async fn verify_question_bank(pool: &SqlitePool) -> Result<(), AppError> {
    let bank = sqlx::query_as::<_, Question>(
        r#"
        SELECT quiz_id, question, two_category, options_json, correct_text, explanation
        FROM quiz
        "#,
    )
    .fetch_all(pool)
    .await?;

    engine::validate_bank(&bank)
}
