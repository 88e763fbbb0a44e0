mod catalog;
mod inventory;
mod media;

pub use catalog::CatalogService;
pub use inventory::{
    CreateDefinitionRequest, InventoryService, IssueOptions, IssueRequest, ItemRequest, MAX_ISSUE_AMOUNT, MergeRequest,
    MoveRequest, Outcome, SetDurabilityRequest, Snapshot, SplitRequest, TransferRequest, Weight, view,
};
pub use media::{LocalMediaStore, MediaStore, MemoryMediaStore};
