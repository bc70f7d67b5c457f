//! Read-only view of the lexer's token stream.

use crate::TerminalId;

/// An indexable, length-queryable sequence of token types.
///
/// The completion core peeks tokens but never advances or mutates the
/// stream, so any lexer output that can report a token type by index
/// qualifies. Hidden-channel tokens (whitespace, comments) are expected to
/// be filtered out by the host before the stream reaches the core.
pub trait TokenStream {
    /// Number of tokens in the stream.
    fn len(&self) -> usize;

    /// Token type at `index`, or `None` past the end.
    fn get(&self, index: usize) -> Option<TerminalId>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TokenStream for [TerminalId] {
    #[inline]
    fn len(&self) -> usize {
        <[TerminalId]>::len(self)
    }

    #[inline]
    fn get(&self, index: usize) -> Option<TerminalId> {
        <[TerminalId]>::get(self, index).copied()
    }
}

impl TokenStream for Vec<TerminalId> {
    #[inline]
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline]
    fn get(&self, index: usize) -> Option<TerminalId> {
        self.as_slice().get(index).copied()
    }
}

impl<T: TokenStream + ?Sized> TokenStream for &T {
    #[inline]
    fn len(&self) -> usize {
        (**self).len()
    }

    #[inline]
    fn get(&self, index: usize) -> Option<TerminalId> {
        (**self).get(index)
    }
}
