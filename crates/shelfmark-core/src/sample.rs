use chrono::NaiveDate;

use crate::models::Book;

const XIANLIN: &str = "Xianlin Library";
const SANPAILOU: &str = "Sanpailou Library";

type Row = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    u32,
    f64,
    (i32, u32, u32),
    Option<(i32, u32, u32)>,
    u32,
);

#[rustfmt::skip]
const ROWS: &[Row] = &[
    ("CS001", "C++ Programming", XIANLIN, "Computer Science", 5, 45.80, (2023, 1, 15), None, 12),
    ("CS002", "Data Structures and Algorithm Analysis", SANPAILOU, "Computer Science", 3, 68.50, (2023, 2, 20), None, 8),
    ("CS003", "Operating System Concepts", XIANLIN, "Computer Science", 4, 89.00, (2023, 3, 10), None, 15),
    ("CS004", "Computer Networks", SANPAILOU, "Computer Science", 6, 76.20, (2023, 1, 25), None, 9),
    ("CS005", "Database System Concepts", XIANLIN, "Computer Science", 2, 92.50, (2023, 4, 5), None, 6),
    ("LIT001", "Dream of the Red Chamber", SANPAILOU, "Literature", 8, 35.60, (2023, 1, 10), None, 25),
    ("LIT002", "One Hundred Years of Solitude", XIANLIN, "Literature", 4, 42.80, (2023, 2, 15), None, 18),
    ("LIT003", "To Live", SANPAILOU, "Literature", 6, 28.90, (2023, 3, 1), None, 22),
    ("LIT004", "Ordinary World", XIANLIN, "Literature", 5, 55.00, (2023, 1, 20), None, 16),
    ("LIT005", "Fortress Besieged", SANPAILOU, "Literature", 3, 38.50, (2023, 2, 28), None, 14),
    ("HIS001", "General History of China", XIANLIN, "History", 4, 78.00, (2023, 1, 5), None, 11),
    ("HIS002", "History of World Civilization", SANPAILOU, "History", 3, 85.50, (2023, 3, 15), None, 7),
    ("HIS003", "Those Things of the Ming Dynasty", XIANLIN, "History", 6, 48.80, (2023, 2, 10), None, 20),
    ("HIS004", "Sapiens", SANPAILOU, "History", 5, 65.20, (2023, 4, 1), None, 13),
    ("SCI001", "A Brief History of Time", XIANLIN, "Science", 3, 52.00, (2023, 1, 30), None, 9),
    ("SCI002", "On the Origin of Species", SANPAILOU, "Science", 2, 68.80, (2023, 3, 20), None, 5),
    ("SCI003", "Relativity", XIANLIN, "Science", 1, 75.50, (2023, 2, 25), None, 3),
    ("SCI004", "Principles of Quantum Mechanics", SANPAILOU, "Science", 2, 88.00, (2023, 4, 10), None, 4),
    ("ENG001", "New Concept English", XIANLIN, "Languages", 10, 32.50, (2023, 1, 12), None, 35),
    ("ENG002", "Essential TOEFL Vocabulary", SANPAILOU, "Languages", 8, 45.80, (2023, 2, 18), None, 28),
    ("ENG003", "IELTS Exam Guide", XIANLIN, "Languages", 6, 58.20, (2023, 3, 8), None, 19),
    ("ENG004", "Business English", SANPAILOU, "Languages", 4, 42.00, (2023, 1, 28), None, 12),
    ("ART001", "History of Western Art", XIANLIN, "Art", 3, 72.50, (2023, 2, 5), None, 8),
    ("ART002", "The Art of Chinese Calligraphy", SANPAILOU, "Art", 2, 55.80, (2023, 3, 12), None, 6),
    ("ART003", "Fundamentals of Music Theory", XIANLIN, "Art", 4, 48.00, (2023, 1, 18), None, 10),
    ("PHI001", "The Analects", SANPAILOU, "Philosophy", 5, 25.80, (2023, 1, 8), None, 17),
    ("PHI002", "Tao Te Ching", XIANLIN, "Philosophy", 4, 22.50, (2023, 2, 22), None, 14),
    ("PHI003", "Sophie's World", SANPAILOU, "Philosophy", 3, 38.80, (2023, 3, 25), None, 11),
    ("CS006", "Introduction to Artificial Intelligence", XIANLIN, "Computer Science", 2, 95.00, (2023, 4, 15), Some((2024, 1, 15)), 3),
    ("LIT006", "1984", SANPAILOU, "Literature", 3, 36.50, (2023, 2, 8), Some((2024, 1, 20)), 7),
    ("ENG005", "Complete English Grammar", XIANLIN, "Languages", 5, 52.80, (2023, 3, 18), Some((2024, 1, 25)), 9),
    ("SCI005", "Mysteries of the Universe", SANPAILOU, "Science", 2, 68.00, (2023, 1, 22), Some((2024, 1, 30)), 5),
];

fn ymd((y, m, d): (i32, u32, u32)) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

/// Demonstration inventory for a fresh catalog: 32 titles over two branches,
/// the last four with a copy out on loan.
pub fn sample_books() -> Vec<Book> {
    ROWS.iter()
        .filter_map(|&(id, name, location, category, quantity, price, in_date, due, borrows)| {
            Some(
                Book::new(id, name, ymd(in_date)?)
                    .with_location(location)
                    .with_category(category)
                    .with_quantity(quantity)
                    .with_price(price)
                    .with_return_date(due.and_then(ymd))
                    .with_borrow_count(borrows),
            )
        })
        .collect()
}
