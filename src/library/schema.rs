//! Tables of the library database. These declarations are the only source
//! of identifiers for the library operations.

use crate::table;

table! {
    pub struct Categories("categories") {
        CategoryColumns {
            id: "id",
            name: "nom",
            description: "description",
        }
    }
}

table! {
    pub struct Users("utilisateurs") {
        UserColumns {
            id: "id",
            last_name: "nom",
            first_name: "prenom",
            email: "email",
            phone: "telephone",
            registered_at: "date_inscription",
            loan_count: "nombre_emprunts",
        }
    }
}

table! {
    pub struct Books("livres") {
        BookColumns {
            id: "id",
            title: "titre",
            author: "auteur",
            year: "annee",
            isbn: "isbn",
            category_id: "categorie_id",
            available: "disponible",
            added_at: "date_ajout",
        }
    }
}

table! {
    pub struct Loans("emprunts") {
        LoanColumns {
            id: "id",
            user_id: "utilisateur_id",
            book_id: "livre_id",
            borrowed_at: "date_emprunt",
            due_at: "date_retour_prevue",
            returned_at: "date_retour_effective",
        }
    }
}
