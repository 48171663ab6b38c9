/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! A depth-3 RDF triple store layered over [`crate::Hypertrie`].
//!
//! This is deliberately thin: it interns subject/predicate/object terms to
//! [`KeyPart`]s and hands triples to a fixed-depth-3 hypertrie. It does not
//! parse any RDF serialization (N-Triples, Turtle, ...) and does not
//! evaluate SPARQL — callers supply already-split `(subject, predicate,
//! object)` triples.

use std::collections::HashMap;

use archery::{RcK, SharedPointerKind};

use crate::hypertrie::Hypertrie;
use crate::KeyPart;

/// An RDF term: an IRI, blank node label, or literal, compared and encoded
/// purely as text (no datatype/language-tag handling).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Term(String);

impl Term {
    /// Wraps a term's lexical form.
    pub fn new(value: impl Into<String>) -> Self {
        Term(value.into())
    }

    /// The term's lexical form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Term {
    fn from(value: &str) -> Self {
        Term::new(value)
    }
}

/// A bidirectional `Term <-> KeyPart` mapping. Ids start at 1, since `0` is
/// the hypertrie's reserved sentinel value.
#[derive(Debug)]
pub struct TermDictionary {
    term_to_id: HashMap<Term, KeyPart>,
    id_to_term: Vec<Term>,
}

impl TermDictionary {
    /// An empty dictionary.
    pub fn new() -> Self {
        TermDictionary { term_to_id: HashMap::new(), id_to_term: vec![Term(String::new())] }
    }

    /// Looks up `term`'s id, assigning a fresh one the first time it's seen.
    pub fn intern(&mut self, term: &Term) -> KeyPart {
        if let Some(&id) = self.term_to_id.get(term) {
            return id;
        }
        let id = self.id_to_term.len() as KeyPart;
        self.id_to_term.push(term.clone());
        self.term_to_id.insert(term.clone(), id);
        id
    }

    /// `term`'s id, if it has ever been interned.
    pub fn id_of(&self, term: &Term) -> Option<KeyPart> {
        self.term_to_id.get(term).copied()
    }

    /// The term behind `id`, if any.
    pub fn term_of(&self, id: KeyPart) -> Option<&Term> {
        self.id_to_term.get(id as usize)
    }

    /// Number of distinct terms interned.
    pub fn len(&self) -> usize {
        self.id_to_term.len() - 1
    }

    /// True iff no terms have been interned.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TermDictionary {
    fn default() -> Self {
        TermDictionary::new()
    }
}

/// A depth-3 hypertrie of interned RDF triples plus the dictionary needed to
/// encode and decode their terms.
pub struct TripleStore<P: SharedPointerKind = RcK> {
    dictionary: TermDictionary,
    trie: Hypertrie<P>,
}

impl<P: SharedPointerKind> TripleStore<P> {
    /// An empty triple store.
    pub fn new() -> Self {
        TripleStore { dictionary: TermDictionary::new(), trie: Hypertrie::new(3).expect("depth 3 is always supported") }
    }

    /// The term dictionary backing this store.
    pub fn dictionary(&self) -> &TermDictionary {
        &self.dictionary
    }

    /// The underlying depth-3 hypertrie of interned triples.
    pub fn hypertrie(&self) -> &Hypertrie<P> {
        &self.trie
    }

    /// Number of distinct triples stored.
    pub fn len(&self) -> u64 {
        self.trie.size()
    }

    /// True iff no triples are stored.
    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }

    /// Inserts one triple, interning its terms as needed. Returns `true` if
    /// it was newly added.
    pub fn insert(&mut self, subject: &Term, predicate: &Term, object: &Term) -> bool {
        let s = self.dictionary.intern(subject);
        let p = self.dictionary.intern(predicate);
        let o = self.dictionary.intern(object);
        self.trie.set(&[s, p, o])
    }

    /// Membership test over raw terms.
    pub fn contains(&self, subject: &Term, predicate: &Term, object: &Term) -> bool {
        match (
            self.dictionary.id_of(subject),
            self.dictionary.id_of(predicate),
            self.dictionary.id_of(object),
        ) {
            (Some(s), Some(p), Some(o)) => self.trie.contains(&[s, p, o]),
            _ => false,
        }
    }

    /// Bulk-loads `triples`, logging progress the way a long-running import
    /// job would.
    pub fn load_triples<'a, I>(&mut self, triples: I) -> usize
    where
        I: IntoIterator<Item = (&'a Term, &'a Term, &'a Term)>,
    {
        let mut loaded = 0usize;
        for (s, p, o) in triples {
            if self.insert(s, p, o) {
                loaded += 1;
                if loaded % 100_000 == 0 {
                    log::info!("loaded {loaded} triples so far");
                }
            }
        }
        log::info!("loaded {loaded} triples ({} distinct terms)", self.dictionary.len());
        loaded
    }
}

impl<P: SharedPointerKind> Default for TripleStore<P> {
    fn default() -> Self {
        TripleStore::new()
    }
}
