// ==========================================
// 库存文件导入系统 - 导入事件与分发器
// ==========================================
// 职责: 无效行/无效实体通知 + 可取消的落库前通知
// 说明: 单线程同步分发，按注册顺序逐个调用，全部返回后发布方才继续
// ==========================================

use crate::domain::{ErrorSubject, Product, RawRow, ViolationList};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::debug;

// ==========================================
// 事件类型
// ==========================================

/// 无效主体（借用）
#[derive(Debug, Clone, Copy)]
pub enum InvalidSubject<'a> {
    Row(&'a RawRow),
    Product(&'a Product),
}

impl InvalidSubject<'_> {
    pub fn to_error_subject(&self) -> ErrorSubject {
        match self {
            InvalidSubject::Row(row) => ErrorSubject::Row((*row).clone()),
            InvalidSubject::Product(product) => ErrorSubject::Product((*product).clone()),
        }
    }
}

/// 无效行 / 无效实体事件
///
/// 行校验失败与实体校验失败共用该事件，由 subject 区分来源
#[derive(Debug, Clone, Copy)]
pub struct InvalidEntityEvent<'a> {
    subject: InvalidSubject<'a>,
    violations: &'a ViolationList,
}

impl<'a> InvalidEntityEvent<'a> {
    pub fn row(row: &'a RawRow, violations: &'a ViolationList) -> Self {
        Self {
            subject: InvalidSubject::Row(row),
            violations,
        }
    }

    pub fn product(product: &'a Product, violations: &'a ViolationList) -> Self {
        Self {
            subject: InvalidSubject::Product(product),
            violations,
        }
    }

    pub fn subject(&self) -> InvalidSubject<'a> {
        self.subject
    }

    pub fn violations(&self) -> &'a ViolationList {
        self.violations
    }

    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }
}

/// 落库前事件（可取消）
#[derive(Debug)]
pub struct BeforePersistEvent<'a> {
    product: &'a Product,
    cancelled: bool,
}

impl<'a> BeforePersistEvent<'a> {
    pub fn new(product: &'a Product) -> Self {
        Self {
            product,
            cancelled: false,
        }
    }

    pub fn product(&self) -> &'a Product {
        self.product
    }

    /// 取消保存
    pub fn cancel_save(&mut self) {
        self.cancelled = true;
    }

    /// 恢复保存
    pub fn do_not_cancel(&mut self) {
        self.cancelled = false;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

// ==========================================
// 监听器 Trait
// ==========================================

pub trait InvalidEntityListener {
    fn on_invalid_entity(&self, event: &InvalidEntityEvent<'_>);
}

pub trait BeforePersistListener {
    fn on_before_persist(&self, event: &mut BeforePersistEvent<'_>);
}

impl<F> InvalidEntityListener for F
where
    F: Fn(&InvalidEntityEvent<'_>),
{
    fn on_invalid_entity(&self, event: &InvalidEntityEvent<'_>) {
        self(event)
    }
}

impl<F> BeforePersistListener for F
where
    F: Fn(&mut BeforePersistEvent<'_>),
{
    fn on_before_persist(&self, event: &mut BeforePersistEvent<'_>) {
        self(event)
    }
}

/// 总是取消保存的监听器
///
/// 只在确定不落库时注册（如命令行 --test 试运行）
#[derive(Debug, Clone, Copy, Default)]
pub struct CancelSaveListener;

impl BeforePersistListener for CancelSaveListener {
    fn on_before_persist(&self, event: &mut BeforePersistEvent<'_>) {
        event.cancel_save();
    }
}

// ==========================================
// EventDispatcher - 事件分发器
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
pub struct EventDispatcher {
    next_id: Cell<u64>,
    invalid_entity: RefCell<Vec<(ListenerId, Rc<dyn InvalidEntityListener>)>>,
    before_persist: RefCell<Vec<(ListenerId, Rc<dyn BeforePersistListener>)>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_listener_id(&self) -> ListenerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        ListenerId(id)
    }

    pub fn add_invalid_entity_listener<L>(&self, listener: L) -> ListenerId
    where
        L: InvalidEntityListener + 'static,
    {
        let id = self.next_listener_id();
        let listener: Rc<dyn InvalidEntityListener> = Rc::new(listener);
        self.invalid_entity.borrow_mut().push((id, listener));
        id
    }

    pub fn add_before_persist_listener<L>(&self, listener: L) -> ListenerId
    where
        L: BeforePersistListener + 'static,
    {
        let id = self.next_listener_id();
        let listener: Rc<dyn BeforePersistListener> = Rc::new(listener);
        self.before_persist.borrow_mut().push((id, listener));
        id
    }

    /// 注册仅在 guard 存活期间有效的无效实体监听器
    pub fn scoped_invalid_entity_listener<L>(self: &Rc<Self>, listener: L) -> ListenerGuard
    where
        L: InvalidEntityListener + 'static,
    {
        let id = self.add_invalid_entity_listener(listener);
        ListenerGuard {
            dispatcher: Rc::clone(self),
            id,
        }
    }

    /// 注销监听器，返回是否确实移除
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut removed = false;
        self.invalid_entity.borrow_mut().retain(|(lid, _)| {
            let keep = *lid != id;
            removed |= !keep;
            keep
        });
        self.before_persist.borrow_mut().retain(|(lid, _)| {
            let keep = *lid != id;
            removed |= !keep;
            keep
        });
        removed
    }

    pub fn invalid_entity_listener_count(&self) -> usize {
        self.invalid_entity.borrow().len()
    }

    pub fn before_persist_listener_count(&self) -> usize {
        self.before_persist.borrow().len()
    }

    /// 分发无效实体事件
    pub fn dispatch_invalid_entity(&self, event: &InvalidEntityEvent<'_>) {
        // 先取快照，允许监听器在回调中增删监听器
        let listeners: Vec<_> = self
            .invalid_entity
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();

        debug!(
            listeners = listeners.len(),
            violations = event.violations().len(),
            "分发无效实体事件"
        );
        for listener in listeners {
            listener.on_invalid_entity(event);
        }
    }

    /// 分发落库前事件，返回事件的最终取消状态
    pub fn dispatch_before_persist(&self, event: &mut BeforePersistEvent<'_>) -> bool {
        let listeners: Vec<_> = self
            .before_persist
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();

        for listener in listeners {
            listener.on_before_persist(event);
        }
        event.is_cancelled()
    }
}

/// 作用域监听器，drop 时自动注销
pub struct ListenerGuard {
    dispatcher: Rc<EventDispatcher>,
    id: ListenerId,
}

impl ListenerGuard {
    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.dispatcher.remove_listener(self.id);
    }
}
