pub mod random_loans;
