//! Lock-free SPSC command queue (C7): the only channel between the GUI
//! thread and the audio thread. An intrusive singly-linked list with a
//! sentinel node, not a ring buffer — messages carry heap-owned payloads
//! (a boxed edit command) of unpredictable size, which a fixed-capacity
//! ring like `rtrb` isn't shaped for.
//!
//! Grounded on `cmd_queue.h` / `audio_cmd.h` / `audio_cmd.cpp` in the
//! original implementation; the lock-free push/pop protocol follows the
//! classic Vyukov intrusive MPSC queue, specialized here to single-producer.

use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

use crate::doc::TickT;
use crate::edit::EditBox;

/// One message sent from the GUI thread to the audio thread.
pub enum MessageBody {
    PlayFrom(TickT),
    StopPlayback,
    SwapDocument(EditBox),
}

struct Node {
    msg: Option<MessageBody>,
    next: AtomicPtr<Node>,
}

impl Node {
    fn sentinel() -> *mut Node {
        Box::into_raw(Box::new(Node {
            msg: None,
            next: AtomicPtr::new(ptr::null_mut()),
        }))
    }
}

/// Single-producer single-consumer queue of [`MessageBody`]. The GUI thread
/// is the only producer (`push`); the audio thread is the only consumer
/// (`pop`), called once per audio callback before rendering.
pub struct CommandQueue {
    /// Producer-owned logical "back" of the queue. Atomic because `push`
    /// must publish the new tail before the old tail's `next` link is
    /// wired up, so a concurrent `pop` never sees a dangling link.
    head: AtomicPtr<Node>,
    /// Consumer-owned logical "front". Only `pop` ever touches this after
    /// construction; stored as `AtomicPtr` purely for interior mutability
    /// through `&self`, always accessed with `Relaxed` ordering.
    tail: AtomicPtr<Node>,
}

unsafe impl Send for CommandQueue {}
unsafe impl Sync for CommandQueue {}

impl CommandQueue {
    pub fn new() -> Self {
        let stub = Node::sentinel();
        Self {
            head: AtomicPtr::new(stub),
            tail: AtomicPtr::new(stub),
        }
    }

    /// Push `msg` onto the back of the queue. Never blocks; allocates one
    /// node. Safe to call concurrently with `pop`, but never from more
    /// than one producer thread at a time.
    pub fn push(&self, msg: MessageBody) {
        let node = Box::into_raw(Box::new(Node {
            msg: Some(msg),
            next: AtomicPtr::new(ptr::null_mut()),
        }));
        let prev = self.head.swap(node, Ordering::AcqRel);
        unsafe {
            (*prev).next.store(node, Ordering::Release);
        }
    }

    /// Pop the oldest message, if any. Never blocks and never allocates.
    /// Only ever called from the single consumer thread.
    pub fn pop(&self) -> Option<MessageBody> {
        let tail = self.tail.load(Ordering::Relaxed);
        let next = unsafe { (*tail).next.load(Ordering::Acquire) };
        if next.is_null() {
            return None;
        }
        let msg = unsafe { (*next).msg.take() };
        self.tail.store(next, Ordering::Relaxed);
        unsafe {
            drop(Box::from_raw(tail));
        }
        msg
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CommandQueue {
    fn drop(&mut self) {
        let mut current = *self.tail.get_mut();
        while !current.is_null() {
            let next = unsafe { *(*current).next.get_mut() };
            unsafe {
                drop(Box::from_raw(current));
            }
            current = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_on_empty_queue_returns_none() {
        let q = CommandQueue::new();
        assert!(q.pop().is_none());
    }

    #[test]
    fn push_then_pop_preserves_order() {
        let q = CommandQueue::new();
        q.push(MessageBody::PlayFrom(10));
        q.push(MessageBody::StopPlayback);

        match q.pop() {
            Some(MessageBody::PlayFrom(10)) => {}
            _ => panic!("expected PlayFrom(10) first"),
        }
        match q.pop() {
            Some(MessageBody::StopPlayback) => {}
            _ => panic!("expected StopPlayback second"),
        }
        assert!(q.pop().is_none());
    }

    #[test]
    fn drop_frees_unconsumed_messages() {
        let q = CommandQueue::new();
        q.push(MessageBody::PlayFrom(1));
        q.push(MessageBody::PlayFrom(2));
        q.push(MessageBody::PlayFrom(3));
        // Leaving messages unconsumed exercises Drop's destroy_all path.
        drop(q);
    }

    #[test]
    fn producer_consumer_threads_see_every_message() {
        use std::sync::Arc;
        use std::thread;

        let q = Arc::new(CommandQueue::new());
        let producer_q = Arc::clone(&q);
        let producer = thread::spawn(move || {
            for i in 0..1000 {
                producer_q.push(MessageBody::PlayFrom(i));
            }
        });

        let mut received = 0;
        while received < 1000 {
            if q.pop().is_some() {
                received += 1;
            }
        }
        producer.join().unwrap();
        assert_eq!(received, 1000);
    }
}
