// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 memlay contributors

//! Indexable element views over array fields.

use std::cell::RefCell;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::{TypeDescriptor, Value};
use crate::view::size::dynamic_size;
use crate::view::struct_view::{read_value, write_value, StructRef};

/// Read-only element view with a resolved length.
///
/// For dynamic elements the per-element offsets are discovered by walking
/// the buffer; the walk is memoized for the lifetime of this view only, so
/// a fresh view always sees the live counters.
#[derive(Debug, Clone)]
pub struct ArrayRef<'b> {
    buf: &'b [u8],
    base: usize,
    element: Arc<TypeDescriptor>,
    len: usize,
    offsets: RefCell<Vec<usize>>,
}

impl<'b> ArrayRef<'b> {
    pub(crate) fn new(buf: &'b [u8], base: usize, element: Arc<TypeDescriptor>, len: usize) -> Self {
        Self {
            buf,
            base,
            element,
            len,
            offsets: RefCell::new(Vec::new()),
        }
    }

    /// Resolved element count (counter-clamped for counted arrays).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn element(&self) -> &Arc<TypeDescriptor> {
        &self.element
    }

    fn check(&self, index: usize) -> Result<()> {
        if index >= self.len {
            return Err(Error::IndexOutOfBounds {
                index,
                length: self.len,
            });
        }
        Ok(())
    }

    fn offset(&self, index: usize) -> Result<usize> {
        if !self.element.is_dynamic() {
            return Ok(self.base + index * self.element.size() as usize);
        }
        let mut offsets = self.offsets.borrow_mut();
        if offsets.is_empty() {
            offsets.push(self.base);
        }
        while offsets.len() <= index {
            let last = *offsets.last().expect("seeded above");
            let next = last + dynamic_size(self.buf, last, &self.element)?;
            offsets.push(next);
        }
        Ok(offsets[index])
    }

    /// Decode the element at `index`.
    pub fn get(&self, index: usize) -> Result<Value> {
        self.check(index)?;
        let offset = self.offset(index)?;
        read_value(self.buf, offset, &self.element)
    }

    /// Struct view of the element at `index` (struct elements only).
    pub fn at(&self, index: usize) -> Result<StructRef<'b>> {
        self.check(index)?;
        let offset = self.offset(index)?;
        StructRef::new(self.buf, offset, self.element.clone())
    }

    /// Iterate the decoded elements.
    pub fn iter(&self) -> impl Iterator<Item = Result<Value>> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }
}

/// Mutable element view with a resolved length.
///
/// Offsets are recomputed on every access: writing an element can change
/// the sizes that position its successors.
#[derive(Debug)]
pub struct ArrayMut<'b> {
    buf: &'b mut [u8],
    base: usize,
    element: Arc<TypeDescriptor>,
    len: usize,
}

impl<'b> ArrayMut<'b> {
    pub(crate) fn new(buf: &'b mut [u8], base: usize, element: Arc<TypeDescriptor>, len: usize) -> Self {
        Self {
            buf,
            base,
            element,
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn check(&self, index: usize) -> Result<()> {
        if index >= self.len {
            return Err(Error::IndexOutOfBounds {
                index,
                length: self.len,
            });
        }
        Ok(())
    }

    fn offset(&self, index: usize) -> Result<usize> {
        if !self.element.is_dynamic() {
            return Ok(self.base + index * self.element.size() as usize);
        }
        let mut cursor = self.base;
        for _ in 0..index {
            cursor += dynamic_size(self.buf, cursor, &self.element)?;
        }
        Ok(cursor)
    }

    pub fn get(&self, index: usize) -> Result<Value> {
        self.check(index)?;
        let offset = self.offset(index)?;
        read_value(self.buf, offset, &self.element)
    }

    /// Encode the element at `index`.
    ///
    /// For dynamic elements, write counters of earlier elements before
    /// later elements: their sizes position everything after them.
    pub fn set(&mut self, index: usize, value: &Value) -> Result<()> {
        self.check(index)?;
        let offset = self.offset(index)?;
        let element = self.element.clone();
        write_value(self.buf, offset, &element, value)
    }
}
