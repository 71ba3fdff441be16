//! ABI binding for the deployed coffee contract.

use alloy_sol_types::sol;

sol! {
    interface IBuyMeACoffee {
        // Field order matches the on-chain struct, where `sender` is named `from`.
        struct Memo {
            address sender;
            string name;
            string message;
            uint256 timestamp;
            uint256 amount;
        }

        function getMemos() external view returns (Memo[] memory);

        function buyCoffee(string memory name, string memory message) external payable;
    }
}
